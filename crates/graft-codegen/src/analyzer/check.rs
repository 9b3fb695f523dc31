//! Static checks over every type declaration of a package.

use super::package::Package;
use super::scope::{
    Canonicalizer, DeclKind, LocalItem, Resolution, SymPath, SymbolTable, TypeContext,
};
use crate::error::Diagnostic;
use std::collections::{BTreeMap, BTreeSet};
use syn::ext::IdentExt;
use syn::{Fields, GenericArgument, GenericParam, Generics, Item, PathArguments, Type};

/// A declaration, identified by module index and name.
type Node = (usize, String);

/// Generic parameters of a declaration, plus its own path for `Self`.
pub(super) fn context_for(
    table: &SymbolTable,
    module: usize,
    name: &str,
    generics: &Generics,
) -> TypeContext {
    let params = generics
        .params
        .iter()
        .filter_map(|param| match param {
            GenericParam::Type(t) => Some(t.ident.unraw().to_string()),
            GenericParam::Const(c) => Some(c.ident.unraw().to_string()),
            GenericParam::Lifetime(_) => None,
        })
        .collect();
    let self_path = table.public_path(module, name).unwrap_or_else(|| {
        let mut path = table.module_path(module).segments().to_vec();
        path.push(name.to_string());
        path
    });
    TypeContext {
        generics: params,
        self_path: Some(self_path),
    }
}

fn field_types(fields: &Fields) -> impl Iterator<Item = &Type> {
    fields.iter().map(|field| &field.ty)
}

/// Types mentioned by one declaration, with the context they are resolved in.
fn declared_types<'a>(
    table: &SymbolTable,
    module: usize,
    item: &'a Item,
) -> Option<(String, TypeContext, Vec<&'a Type>)> {
    match item {
        Item::Struct(s) => {
            let name = s.ident.unraw().to_string();
            let context = context_for(table, module, &name, &s.generics);
            Some((name, context, field_types(&s.fields).collect()))
        }
        Item::Enum(e) => {
            let name = e.ident.unraw().to_string();
            let context = context_for(table, module, &name, &e.generics);
            let types = e
                .variants
                .iter()
                .flat_map(|variant| field_types(&variant.fields))
                .collect();
            Some((name, context, types))
        }
        Item::Union(u) => {
            let name = u.ident.unraw().to_string();
            let context = context_for(table, module, &name, &u.generics);
            Some((name, context, u.fields.named.iter().map(|f| &f.ty).collect()))
        }
        Item::Type(alias) => {
            let name = alias.ident.unraw().to_string();
            let context = context_for(table, module, &name, &alias.generics);
            Some((name, context, vec![alias.ty.as_ref()]))
        }
        _ => None,
    }
}

/// Report every type path in a struct, enum, union or alias that resolves to
/// nothing, or to several glob imports at once.
pub(super) fn unresolved_names(
    package: &Package,
    table: &SymbolTable,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (index, module) in package.modules.iter().enumerate() {
        for item in &module.items {
            let Some((name, context, types)) = declared_types(table, index, item) else {
                continue;
            };
            let mut canonicalizer = Canonicalizer::new(table, index, &context);
            for ty in types {
                canonicalizer.rewrite(ty);
            }
            let mut seen = BTreeSet::new();
            for missing in canonicalizer.unresolved {
                if seen.insert(missing.clone()) {
                    diagnostics.push(Diagnostic::new(
                        &module.file,
                        format!("cannot find type `{missing}` used by `{}::{name}`", module.path),
                    ));
                }
            }
            for (path, candidates) in canonicalizer.ambiguous {
                if seen.insert(path.clone()) {
                    let candidates: Vec<String> =
                        candidates.iter().map(|c| format!("`{c}`")).collect();
                    diagnostics.push(Diagnostic::new(
                        &module.file,
                        format!(
                            "type `{path}` used by `{}::{name}` is ambiguous between {}; \
                             import it by name",
                            module.path,
                            candidates.join(" and ")
                        ),
                    ));
                }
            }
        }
    }
}

/// Report type aliases whose expansion mentions themselves.
pub(super) fn alias_cycles(
    package: &Package,
    table: &SymbolTable,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut edges: BTreeMap<Node, Vec<Node>> = BTreeMap::new();
    for (index, module) in package.modules.iter().enumerate() {
        for item in &module.items {
            let Item::Type(alias) = item else { continue };
            let name = alias.ident.unraw().to_string();
            let context = context_for(table, index, &name, &alias.generics);
            let mut canonicalizer = Canonicalizer::new(table, index, &context);
            canonicalizer.rewrite(&alias.ty);
            let targets = canonicalizer
                .locals
                .into_iter()
                .filter(|local| local.decl.kind == DeclKind::Alias)
                .map(|local| (local.module, local.name))
                .collect();
            edges.insert((index, name), targets);
        }
    }

    for (module, name) in on_cycle(&edges) {
        diagnostics.push(Diagnostic::new(
            &package.modules[module].file,
            format!(
                "type alias `{}::{name}` expands to itself",
                package.modules[module].path
            ),
        ));
    }
}

/// Report structs, enums and unions that contain themselves by value.
pub(super) fn recursive_types(
    package: &Package,
    table: &SymbolTable,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut edges: BTreeMap<Node, Vec<Node>> = BTreeMap::new();
    for (index, module) in package.modules.iter().enumerate() {
        for item in &module.items {
            if matches!(item, Item::Type(_)) {
                continue;
            }
            let Some((name, context, types)) = declared_types(table, index, item) else {
                continue;
            };
            let mut walker = ByValue {
                package,
                table,
                found: Vec::new(),
                aliases: BTreeSet::new(),
            };
            for ty in types {
                walker.visit(index, &context, ty);
            }
            let targets = walker
                .found
                .into_iter()
                .map(|local| (local.module, local.name))
                .collect();
            edges.insert((index, name), targets);
        }
    }

    for (module, name) in on_cycle(&edges) {
        diagnostics.push(Diagnostic::new(
            &package.modules[module].file,
            format!(
                "recursive type `{}::{name}` has infinite size",
                package.modules[module].path
            ),
        ));
    }
}

/// Collects the local types a type stores inline.
struct ByValue<'a> {
    package: &'a Package,
    table: &'a SymbolTable,
    found: Vec<LocalItem>,
    aliases: BTreeSet<Node>,
}

impl ByValue<'_> {
    fn visit(&mut self, module: usize, context: &TypeContext, ty: &Type) {
        match ty {
            Type::Tuple(tuple) => {
                for elem in &tuple.elems {
                    self.visit(module, context, elem);
                }
            }
            Type::Array(array) => self.visit(module, context, &array.elem),
            Type::Paren(paren) => self.visit(module, context, &paren.elem),
            Type::Group(group) => self.visit(module, context, &group.elem),
            Type::Path(path) if path.qself.is_none() => {
                let sym = SymPath::from_syn(&path.path);
                if sym.segments.len() == 1 && context.generics.contains(&sym.segments[0]) {
                    return;
                }
                match self.table.resolve(module, &sym) {
                    Some(Resolution::Builtin) => {
                        let inline = matches!(sym.segments[0].as_str(), "Option" | "Result");
                        if let (true, Some(last)) = (inline, path.path.segments.last()) {
                            if let PathArguments::AngleBracketed(args) = &last.arguments {
                                for arg in &args.args {
                                    if let GenericArgument::Type(inner) = arg {
                                        self.visit(module, context, inner);
                                    }
                                }
                            }
                        }
                    }
                    Some(Resolution::Local(local)) if local.decl.kind == DeclKind::Alias => {
                        self.expand_alias(local);
                    }
                    Some(Resolution::Local(local)) if local.decl.kind != DeclKind::Trait => {
                        self.found.push(local);
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn expand_alias(&mut self, local: LocalItem) {
        if !self.aliases.insert((local.module, local.name.clone())) {
            return;
        }
        let items = &self.package.modules[local.module].items;
        let Some(Item::Type(alias)) = items.get(local.decl.item) else {
            return;
        };
        let context = context_for(self.table, local.module, &local.name, &alias.generics);
        self.visit(local.module, &context, &alias.ty);
    }
}

/// Nodes that can reach themselves.
fn on_cycle(edges: &BTreeMap<Node, Vec<Node>>) -> Vec<Node> {
    edges
        .keys()
        .filter(|start| {
            let mut stack: Vec<&Node> = edges.get(*start).into_iter().flatten().collect();
            let mut seen = BTreeSet::new();
            while let Some(node) = stack.pop() {
                if node == *start {
                    return true;
                }
                if seen.insert(node) {
                    stack.extend(edges.get(node).into_iter().flatten());
                }
            }
            false
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::package::{Manifest, SourceModule};
    use crate::model::ModulePath;
    use std::path::PathBuf;

    fn check(src: &str) -> Vec<String> {
        let package = Package {
            manifest: Manifest {
                crate_name: "pkg".to_string(),
                lib_path: PathBuf::from("src/lib.rs"),
                dependencies: BTreeMap::new(),
            },
            dir: PathBuf::new(),
            modules: vec![SourceModule {
                path: ModulePath::root("pkg"),
                file: PathBuf::from("src/lib.rs"),
                items: syn::parse_file(src).unwrap().items,
                parent: None,
                public: true,
            }],
            syntax_errors: Vec::new(),
        };
        let table = SymbolTable::new(&package);
        let mut diagnostics = Vec::new();
        unresolved_names(&package, &table, &mut diagnostics);
        alias_cycles(&package, &table, &mut diagnostics);
        recursive_types(&package, &table, &mut diagnostics);
        diagnostics.into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_valid_declarations() {
        let messages = check(
            r#"
            use std::rc::Rc;
            pub struct Tree { children: Vec<Tree>, parent: Option<Rc<Tree>> }
            pub enum List<T> { Cons(T, Box<List<T>>), Nil }
            pub type Pair<T> = (T, T);
            pub struct Grid<const N: usize> { cells: [u8; N], at: Pair<usize> }
            "#,
        );
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn test_unresolved_name() {
        let messages = check("pub struct Card { body: Vec<Missing> }");
        assert_eq!(messages, vec!["cannot find type `Missing` used by `pkg::Card`"]);
    }

    #[test]
    fn test_glob_ambiguity() {
        let messages = check(
            r#"
            use std::collections::*;
            use std::rc::*;
            pub struct Card { shared: Shared }
            "#,
        );
        assert_eq!(
            messages,
            vec![
                "type `Shared` used by `pkg::Card` is ambiguous between \
                 `std::collections::Shared` and `std::rc::Shared`; import it by name"
            ]
        );
    }

    #[test]
    fn test_alias_cycle() {
        let messages = check("type A = Vec<B>; type B = Option<A>;");
        assert_eq!(
            messages,
            vec![
                "type alias `pkg::A` expands to itself",
                "type alias `pkg::B` expands to itself",
            ]
        );
    }

    #[test]
    fn test_recursive_struct() {
        let messages = check(
            r#"
            pub struct Node { next: Option<Link> }
            type Link = (u8, Node);
            "#,
        );
        assert_eq!(messages, vec!["recursive type `pkg::Node` has infinite size"]);
    }

    #[test]
    fn test_mutual_recursion() {
        let messages = check("struct A { b: [B; 2] } struct B { a: A }");
        assert_eq!(messages.len(), 2);
    }
}
