//! Import resolution for the generated artifact.
//!
//! Every module the artifact names gets one `use` line and a short alias:
//! the last path segment, suffixed `_2`, `_3`, ... when that name is
//! already taken. The runtime crate and the analyzed crate's root claim
//! their names first, so they are never the ones renamed.

use crate::model::{self, Component, ModulePath};
use std::collections::{BTreeMap, BTreeSet};
use syn::ext::IdentExt;
use syn::visit::{self, Visit};
use syn::visit_mut::{self, VisitMut};
use syn::Path;

/// One `use` line of the artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: ModulePath,
    pub alias: String,
}

impl Import {
    /// Whether the line needs an `as` clause.
    pub fn is_renamed(&self) -> bool {
        self.path.last() != Some(self.alias.as_str())
    }
}

/// Deduplicated module references with their aliases.
#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    aliases: BTreeMap<ModulePath, String>,
    taken: BTreeSet<String>,
}

impl ImportSet {
    /// Create a new, empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an alias for `path`; a path keeps the alias of its first claim.
    pub fn claim(&mut self, path: ModulePath) -> &str {
        if !self.aliases.contains_key(&path) {
            let base = path.last().unwrap_or("module").to_string();
            let mut alias = base.clone();
            let mut suffix = 2;
            while self.taken.contains(&alias) {
                alias = format!("{base}_{suffix}");
                suffix += 1;
            }
            self.taken.insert(alias.clone());
            self.aliases.insert(path.clone(), alias);
        }
        self.aliases
            .get(&path)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn alias(&self, path: &ModulePath) -> Option<&str> {
        self.aliases.get(path).map(String::as_str)
    }

    /// Imports ordered lexically by their path.
    pub fn imports(&self) -> Vec<Import> {
        let mut imports: Vec<Import> = self
            .aliases
            .iter()
            .map(|(path, alias)| Import {
                path: path.clone(),
                alias: alias.clone(),
            })
            .collect();
        imports.sort_by_key(|import| import.path.to_string());
        imports
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Copy of `ty` with every absolute path shortened to `alias::Name`.
    pub fn qualify(&self, ty: &syn::Type) -> syn::Type {
        let mut ty = ty.clone();
        Qualifier { imports: self }.visit_type_mut(&mut ty);
        ty
    }
}

/// Collects the import set for the components that will be synthesized.
#[derive(Debug, Clone)]
pub struct ImportResolver {
    runtime: ModulePath,
    root: ModulePath,
}

impl ImportResolver {
    /// Create a new resolver for the given runtime crate and analyzed crate root.
    pub fn new(runtime: &str, root: ModulePath) -> Self {
        Self {
            runtime: ModulePath::root(runtime),
            root,
        }
    }

    pub fn resolve<'a>(&self, components: impl IntoIterator<Item = &'a Component>) -> ImportSet {
        let mut imports = ImportSet::new();
        imports.claim(self.runtime.clone());
        imports.claim(self.root.clone());

        let mut modules = BTreeSet::new();
        for component in components {
            modules.insert(component.module.clone());
            for field in component.fields() {
                ModuleCollector {
                    modules: &mut modules,
                }
                .visit_type(&field.ty);
            }
        }
        for module in modules {
            imports.claim(module);
        }
        imports
    }
}

/// Module part of an absolute path, if it has one.
fn module_of(path: &Path) -> Option<ModulePath> {
    if path.leading_colon.is_none() || path.segments.len() < 2 {
        return None;
    }
    let count = path.segments.len() - 1;
    Some(ModulePath::from_segments(
        path.segments
            .iter()
            .take(count)
            .map(|segment| segment.ident.unraw().to_string()),
    ))
}

struct ModuleCollector<'a> {
    modules: &'a mut BTreeSet<ModulePath>,
}

impl<'ast> Visit<'ast> for ModuleCollector<'_> {
    fn visit_path(&mut self, path: &'ast Path) {
        if let Some(module) = module_of(path) {
            self.modules.insert(module);
        }
        visit::visit_path(self, path);
    }
}

struct Qualifier<'a> {
    imports: &'a ImportSet,
}

impl VisitMut for Qualifier<'_> {
    fn visit_path_mut(&mut self, path: &mut Path) {
        let alias = module_of(path).and_then(|module| self.imports.alias(&module));
        if let Some(alias) = alias {
            if let Some(last) = path.segments.pop() {
                let mut short: Path = model::ident(alias).into();
                short.segments.push(last.into_value());
                *path = short;
            }
        }
        visit_mut::visit_path_mut(self, path);
    }
}
