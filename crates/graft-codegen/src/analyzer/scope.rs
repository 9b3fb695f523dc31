//! Symbol tables for every module of a package and path resolution over them.

use super::package::Package;
use crate::model::{self, ModulePath};
use std::collections::{BTreeMap, BTreeSet};
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::visit_mut::{self, VisitMut};
use syn::{Item, Path, PathArguments, PathSegment, Token, UseTree, Visibility};

/// Upper bound on `use` indirections followed while resolving one path.
const MAX_DEPTH: usize = 32;

const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64",
    "u128", "usize", "f32", "f64",
];

/// Names the standard prelude brings into every module.
const PRELUDE: &[&str] = &[
    "String",
    "Vec",
    "Option",
    "Box",
    "Result",
    "Some",
    "None",
    "Ok",
    "Err",
    "Copy",
    "Clone",
    "Send",
    "Sync",
    "Sized",
    "Unpin",
    "Fn",
    "FnMut",
    "FnOnce",
    "Drop",
    "Default",
    "Debug",
    "Eq",
    "PartialEq",
    "Ord",
    "PartialOrd",
    "Hash",
    "Iterator",
    "IntoIterator",
    "Extend",
    "ToString",
    "ToOwned",
    "AsRef",
    "AsMut",
    "Into",
    "From",
    "TryFrom",
    "TryInto",
];

/// Crates every package can name without declaring them.
const SYSROOT: &[&str] = &["std", "core", "alloc"];

pub fn is_builtin(name: &str) -> bool {
    PRIMITIVES.contains(&name) || PRELUDE.contains(&name)
}

/// A path as spelled in source, reduced to identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymPath {
    /// Spelled with a leading `::`.
    pub global: bool,
    pub segments: Vec<String>,
}

impl SymPath {
    pub fn new(global: bool, segments: Vec<String>) -> Self {
        Self { global, segments }
    }

    pub fn from_syn(path: &Path) -> Self {
        Self {
            global: path.leading_colon.is_some(),
            segments: path
                .segments
                .iter()
                .map(|s| s.ident.unraw().to_string())
                .collect(),
        }
    }

    fn extend(&self, rest: &[String]) -> Self {
        let mut segments = self.segments.clone();
        segments.extend_from_slice(rest);
        Self {
            global: self.global,
            segments,
        }
    }
}

impl std::fmt::Display for SymPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.global {
            f.write_str("::")?;
        }
        f.write_str(&self.segments.join("::"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Struct,
    Enum,
    Union,
    Alias,
    Trait,
}

/// A type-namespace item declared in a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub kind: DeclKind,
    pub public: bool,
    /// Index of the item in its module's item list.
    pub item: usize,
}

#[derive(Debug, Clone)]
struct UseBinding {
    target: SymPath,
    public: bool,
}

/// Names visible in one module.
#[derive(Debug, Default)]
struct Scope {
    decls: BTreeMap<String, Decl>,
    modules: BTreeMap<String, usize>,
    uses: BTreeMap<String, UseBinding>,
    globs: Vec<UseBinding>,
}

#[derive(Debug)]
struct ModuleInfo {
    path: ModulePath,
    parent: Option<usize>,
    public: bool,
    scope: Scope,
}

/// What a type path names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A primitive or prelude name, rendered as written.
    Builtin,
    /// An item of another crate; the first segment is the crate name.
    External(Vec<String>),
    /// An item declared in the analyzed package.
    Local(LocalItem),
    /// Supplied by more than one glob import; holds every candidate path.
    Ambiguous(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalItem {
    pub module: usize,
    pub name: String,
    pub decl: Decl,
    /// Absolute path under which the item can be named from another crate.
    pub public_path: Option<Vec<String>>,
}

impl LocalItem {
    /// Path the item is declared under, reachable or not.
    pub fn declared_path(&self, table: &SymbolTable) -> Vec<String> {
        let mut segments = table.modules[self.module].path.segments().to_vec();
        segments.push(self.name.clone());
        segments
    }
}

/// Symbol tables of every module of a package.
#[derive(Debug)]
pub struct SymbolTable {
    crate_name: String,
    modules: Vec<ModuleInfo>,
    externs: BTreeMap<String, String>,
    /// Public path of items declared in private modules and re-exported with `pub use`.
    reexports: BTreeMap<(usize, String), Vec<String>>,
    /// Top-level names of external crates whose API is known in full.
    exports: BTreeMap<String, BTreeSet<String>>,
}

impl SymbolTable {
    /// Create a new table from a loaded package.
    pub fn new(package: &Package) -> Self {
        let mut modules: Vec<ModuleInfo> = package
            .modules
            .iter()
            .map(|module| ModuleInfo {
                path: module.path.clone(),
                parent: module.parent,
                public: module.public,
                scope: build_scope(&module.items),
            })
            .collect();

        for (index, module) in package.modules.iter().enumerate() {
            if let (Some(parent), Some(name)) = (module.parent, module.name()) {
                modules[parent].scope.modules.insert(name.to_string(), index);
            }
        }

        let mut externs = package.manifest.dependencies.clone();
        externs.insert(
            package.manifest.crate_name.clone(),
            package.manifest.crate_name.clone(),
        );

        let mut table = Self {
            crate_name: package.manifest.crate_name.clone(),
            modules,
            externs,
            reexports: BTreeMap::new(),
            exports: BTreeMap::new(),
        };
        table.reexports = table.collect_reexports();
        table
    }

    /// Declare the complete list of top-level names `krate` exports.
    ///
    /// A glob import of that crate then supplies only these names, which
    /// settles lookups that would otherwise match several glob imports.
    pub fn with_exports<I, S>(mut self, krate: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exports
            .insert(krate.to_string(), names.into_iter().map(Into::into).collect());
        self
    }

    pub fn module_path(&self, module: usize) -> &ModulePath {
        &self.modules[module].path
    }

    /// Look up a declaration by module and name.
    pub fn decl(&self, module: usize, name: &str) -> Option<&Decl> {
        self.modules[module].scope.decls.get(name)
    }

    /// Absolute path under which another crate can name the item `name`
    /// declared in `module`: its declared path when every module on the way
    /// is public, otherwise the shortest public re-export.
    pub fn public_path(&self, module: usize, name: &str) -> Option<Vec<String>> {
        let info = &self.modules[module];
        let decl = info.scope.decls.get(name)?;
        if !decl.public {
            return None;
        }
        if info.public {
            let mut path = info.path.segments().to_vec();
            path.push(name.to_string());
            return Some(path);
        }
        self.reexports.get(&(module, name.to_string())).cloned()
    }

    /// Resolve `path` as a type path appearing in `module`.
    pub fn resolve(&self, module: usize, path: &SymPath) -> Option<Resolution> {
        self.resolve_in(module, path, None, 0)
    }

    fn resolve_in(
        &self,
        module: usize,
        path: &SymPath,
        exclude: Option<&str>,
        depth: usize,
    ) -> Option<Resolution> {
        if depth > MAX_DEPTH {
            return None;
        }
        let (first, rest) = path.segments.split_first()?;
        if path.global {
            return self.external(first, rest, depth);
        }
        if matches!(first.as_str(), "crate" | "self" | "super") {
            return self.walk(module, &path.segments, depth);
        }

        let scope = &self.modules[module].scope;
        if scope.decls.contains_key(first) || scope.modules.contains_key(first) {
            return self.walk(module, &path.segments, depth);
        }
        if exclude != Some(first.as_str()) && scope.uses.contains_key(first) {
            return self.walk(module, &path.segments, depth);
        }
        if rest.is_empty() && is_builtin(first) {
            return Some(Resolution::Builtin);
        }
        if let Some(found) = self.external(first, rest, depth) {
            return Some(found);
        }
        self.through_globs(module, &path.segments, depth)
    }

    /// Resolve `segments` inside the namespace of `module`.
    fn walk(&self, module: usize, segments: &[String], depth: usize) -> Option<Resolution> {
        if depth > MAX_DEPTH {
            return None;
        }
        let (first, rest) = segments.split_first()?;
        let info = &self.modules[module];
        match first.as_str() {
            "crate" => return self.walk(0, rest, depth),
            "self" => return self.walk(module, rest, depth),
            "super" => return self.walk(info.parent?, rest, depth),
            _ => {}
        }

        if rest.is_empty() {
            if let Some(decl) = info.scope.decls.get(first) {
                return Some(Resolution::Local(LocalItem {
                    module,
                    name: first.clone(),
                    decl: decl.clone(),
                    public_path: self.public_path(module, first),
                }));
            }
        } else if let Some(&child) = info.scope.modules.get(first) {
            return self.walk(child, rest, depth);
        }

        if let Some(binding) = info.scope.uses.get(first) {
            let target = binding.target.extend(rest);
            return self.resolve_in(module, &target, Some(first), depth + 1);
        }

        self.through_globs(module, segments, depth)
    }

    /// Resolve `segments` through the glob imports of `module`.
    ///
    /// Names of foreign crates are not checked, so every external glob
    /// matches. When several globs match, local items and names of crates
    /// with known exports win; otherwise the lookup is ambiguous.
    fn through_globs(
        &self,
        module: usize,
        segments: &[String],
        depth: usize,
    ) -> Option<Resolution> {
        let mut candidates: Vec<Resolution> = Vec::new();
        for glob in &self.modules[module].scope.globs {
            let target = glob.target.extend(segments);
            let Some(found) = self.resolve_in(module, &target, None, depth + 1) else {
                continue;
            };
            if self.exported(&found) == Some(false) || candidates.contains(&found) {
                continue;
            }
            candidates.push(found);
        }

        if candidates.len() > 1 {
            let certain: Vec<&Resolution> = candidates
                .iter()
                .filter(|found| match found {
                    Resolution::External(_) => self.exported(found) == Some(true),
                    Resolution::Ambiguous(_) => false,
                    Resolution::Builtin | Resolution::Local(_) => true,
                })
                .collect();
            if let [only] = certain.as_slice() {
                return Some((*only).clone());
            }
            return Some(Resolution::Ambiguous(
                candidates.iter().flat_map(|found| self.describe(found)).collect(),
            ));
        }
        candidates.pop()
    }

    /// Whether an external path names a known export; `None` when the crate's API is unknown.
    fn exported(&self, resolution: &Resolution) -> Option<bool> {
        let Resolution::External(segments) = resolution else {
            return None;
        };
        let names = self.exports.get(&segments[0])?;
        Some(segments.len() == 2 && names.contains(&segments[1]))
    }

    fn describe(&self, resolution: &Resolution) -> Vec<String> {
        match resolution {
            Resolution::Builtin => Vec::new(),
            Resolution::External(segments) => vec![segments.join("::")],
            Resolution::Local(item) => vec![item.declared_path(self).join("::")],
            Resolution::Ambiguous(candidates) => candidates.clone(),
        }
    }

    /// Index of the local module `path` names from inside `module`.
    fn local_module(&self, module: usize, path: &SymPath) -> Option<usize> {
        let mut segments = path.segments.iter();
        let mut current = module;
        if path.global {
            if segments.next()? != &self.crate_name {
                return None;
            }
            current = 0;
        }
        for segment in segments {
            current = match segment.as_str() {
                "crate" => 0,
                "self" => current,
                "super" => self.modules[current].parent?,
                name => *self.modules[current].scope.modules.get(name)?,
            };
        }
        Some(current)
    }

    /// Shortest public re-export of every public item declared in a private module.
    fn collect_reexports(&self) -> BTreeMap<(usize, String), Vec<String>> {
        let mut found: BTreeMap<(usize, String), Vec<String>> = BTreeMap::new();
        let mut offer = |item: (usize, String), path: Vec<String>| {
            let best = found.entry(item).or_insert_with(|| path.clone());
            if (path.len(), &path) < (best.len(), &*best) {
                *best = path;
            }
        };

        for (index, info) in self.modules.iter().enumerate() {
            if !info.public {
                continue;
            }
            let exposed_as = |name: &str| {
                let mut path = info.path.segments().to_vec();
                path.push(name.to_string());
                path
            };

            for (name, binding) in &info.scope.uses {
                if !binding.public {
                    continue;
                }
                let Some(Resolution::Local(item)) = self.walk(index, std::slice::from_ref(name), 0)
                else {
                    continue;
                };
                if item.decl.public && !self.modules[item.module].public {
                    offer((item.module, item.name), exposed_as(name));
                }
            }

            for glob in info.scope.globs.iter().filter(|glob| glob.public) {
                let Some(source) = self.local_module(index, &glob.target) else {
                    continue;
                };
                if self.modules[source].public {
                    continue;
                }
                for (name, decl) in &self.modules[source].scope.decls {
                    let shadowed =
                        info.scope.decls.contains_key(name) || info.scope.uses.contains_key(name);
                    if decl.public && !shadowed {
                        offer((source, name.clone()), exposed_as(name));
                    }
                }
            }
        }
        found
    }

    fn external(&self, first: &str, rest: &[String], depth: usize) -> Option<Resolution> {
        let krate = if SYSROOT.contains(&first) {
            first.to_string()
        } else {
            self.externs.get(first)?.clone()
        };
        if rest.is_empty() {
            return None;
        }
        if krate == self.crate_name {
            return self.walk(0, rest, depth + 1);
        }
        let mut segments = vec![krate];
        segments.extend_from_slice(rest);
        Some(Resolution::External(segments))
    }
}

fn build_scope(items: &[Item]) -> Scope {
    let mut scope = Scope::default();
    for (index, item) in items.iter().enumerate() {
        let (ident, vis, kind) = match item {
            Item::Struct(s) => (&s.ident, &s.vis, DeclKind::Struct),
            Item::Enum(e) => (&e.ident, &e.vis, DeclKind::Enum),
            Item::Union(u) => (&u.ident, &u.vis, DeclKind::Union),
            Item::Type(t) => (&t.ident, &t.vis, DeclKind::Alias),
            Item::Trait(t) => (&t.ident, &t.vis, DeclKind::Trait),
            Item::Use(u) => {
                let public = is_pub(&u.vis);
                let global = u.leading_colon.is_some();
                flatten_use(&u.tree, &mut Vec::new(), global, public, &mut scope);
                continue;
            }
            Item::ExternCrate(e) => {
                let name = match &e.rename {
                    Some((_, rename)) => rename.unraw().to_string(),
                    None => e.ident.unraw().to_string(),
                };
                let target = SymPath::new(true, vec![e.ident.unraw().to_string()]);
                scope.uses.insert(
                    name,
                    UseBinding {
                        target,
                        public: is_pub(&e.vis),
                    },
                );
                continue;
            }
            _ => continue,
        };
        scope.decls.insert(
            ident.unraw().to_string(),
            Decl {
                kind,
                public: is_pub(vis),
                item: index,
            },
        );
    }
    scope
}

fn flatten_use(
    tree: &UseTree,
    prefix: &mut Vec<String>,
    global: bool,
    public: bool,
    scope: &mut Scope,
) {
    let bind = |name: String, target: Vec<String>, scope: &mut Scope| {
        if name != "_" && !target.is_empty() {
            scope.uses.insert(
                name,
                UseBinding {
                    target: SymPath::new(global, target),
                    public,
                },
            );
        }
    };

    match tree {
        UseTree::Path(path) => {
            prefix.push(path.ident.unraw().to_string());
            flatten_use(&path.tree, prefix, global, public, scope);
            prefix.pop();
        }
        UseTree::Name(name) => {
            let ident = name.ident.unraw().to_string();
            if ident == "self" {
                if let Some(last) = prefix.last().cloned() {
                    bind(last, prefix.clone(), scope);
                }
            } else {
                let mut target = prefix.clone();
                target.push(ident.clone());
                bind(ident, target, scope);
            }
        }
        UseTree::Rename(rename) => {
            let ident = rename.ident.unraw().to_string();
            let mut target = prefix.clone();
            if ident != "self" {
                target.push(ident);
            }
            bind(rename.rename.unraw().to_string(), target, scope);
        }
        UseTree::Glob(_) => scope.globs.push(UseBinding {
            target: SymPath::new(global, prefix.clone()),
            public,
        }),
        UseTree::Group(group) => {
            for item in &group.items {
                flatten_use(item, prefix, global, public, scope);
            }
        }
    }
}

pub fn is_pub(vis: &Visibility) -> bool {
    matches!(vis, Visibility::Public(_))
}

/// Build an absolute path from crate-first segments, keeping `arguments` on the last one.
pub fn absolute_path(segments: &[String], arguments: PathArguments) -> Path {
    let mut punctuated: Punctuated<PathSegment, Token![::]> = segments
        .iter()
        .map(|segment| PathSegment::from(model::ident(segment)))
        .collect();
    if let Some(last) = punctuated.last_mut() {
        last.arguments = arguments;
    }
    Path {
        leading_colon: Some(Default::default()),
        segments: punctuated,
    }
}

/// Names that resolve without a table lookup while rewriting one declaration.
#[derive(Debug, Clone, Default)]
pub struct TypeContext {
    /// Generic parameters of the enclosing declaration.
    pub generics: BTreeSet<String>,
    /// Declared path of the enclosing type, substituted for `Self`.
    pub self_path: Option<Vec<String>>,
}

/// Rewrites every named type to an absolute path and records what it could not.
pub struct Canonicalizer<'a> {
    table: &'a SymbolTable,
    module: usize,
    context: &'a TypeContext,
    /// Paths that resolve to nothing.
    pub unresolved: Vec<String>,
    /// Forms the generator cannot express, such as qualified paths and macros.
    pub unsupported: Vec<String>,
    /// Local items referenced that are not reachable from outside the package.
    pub private: Vec<String>,
    /// Paths supplied by several glob imports, with their candidates.
    pub ambiguous: Vec<(String, Vec<String>)>,
    /// Every local item referenced.
    pub locals: Vec<LocalItem>,
}

impl<'a> Canonicalizer<'a> {
    pub fn new(table: &'a SymbolTable, module: usize, context: &'a TypeContext) -> Self {
        Self {
            table,
            module,
            context,
            unresolved: Vec::new(),
            unsupported: Vec::new(),
            private: Vec::new(),
            ambiguous: Vec::new(),
            locals: Vec::new(),
        }
    }

    /// Canonical copy of `ty`.
    pub fn rewrite(&mut self, ty: &syn::Type) -> syn::Type {
        let mut ty = ty.clone();
        self.visit_type_mut(&mut ty);
        ty
    }

    fn rewrite_path(&mut self, path: &mut Path) {
        let sym = SymPath::from_syn(path);
        if !sym.global && sym.segments.len() == 1 {
            let name = &sym.segments[0];
            if self.context.generics.contains(name) {
                return;
            }
            if name == "Self" {
                match &self.context.self_path {
                    Some(self_path) => {
                        *path = absolute_path(self_path, take_last_arguments(path));
                    }
                    None => self.unresolved.push(sym.to_string()),
                }
                return;
            }
        }

        match self.table.resolve(self.module, &sym) {
            Some(Resolution::Builtin) => {}
            Some(Resolution::External(segments)) => {
                *path = absolute_path(&segments, take_last_arguments(path));
            }
            Some(Resolution::Local(item)) => {
                let segments = match &item.public_path {
                    Some(public_path) => public_path.clone(),
                    None => {
                        self.private.push(item.name.clone());
                        item.declared_path(self.table)
                    }
                };
                self.locals.push(item);
                *path = absolute_path(&segments, take_last_arguments(path));
            }
            Some(Resolution::Ambiguous(candidates)) => {
                self.ambiguous.push((sym.to_string(), candidates));
            }
            None => self.unresolved.push(sym.to_string()),
        }
    }
}

fn take_last_arguments(path: &mut Path) -> PathArguments {
    path.segments
        .last_mut()
        .map(|segment| std::mem::replace(&mut segment.arguments, PathArguments::None))
        .unwrap_or(PathArguments::None)
}

impl VisitMut for Canonicalizer<'_> {
    fn visit_type_path_mut(&mut self, node: &mut syn::TypePath) {
        if node.qself.is_some() {
            self.unsupported
                .push(format!("qualified path `{}`", quote::quote!(#node)));
            return;
        }
        self.rewrite_path(&mut node.path);
        visit_mut::visit_type_path_mut(self, node);
    }

    fn visit_trait_bound_mut(&mut self, node: &mut syn::TraitBound) {
        self.rewrite_path(&mut node.path);
        visit_mut::visit_trait_bound_mut(self, node);
    }

    fn visit_type_macro_mut(&mut self, node: &mut syn::TypeMacro) {
        let path = &node.mac.path;
        self.unsupported
            .push(format!("macro `{}!` in type position", quote::quote!(#path)));
    }

    fn visit_expr_mut(&mut self, _node: &mut syn::Expr) {
        // Array lengths and const arguments are not type paths.
    }
}
