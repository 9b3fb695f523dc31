//! Package analysis: load a crate, check it, and classify its components.
//!
//! A component is any non-generic `pub` struct with named fields that other
//! crates can name, either because every module on its declared path is
//! public or through a `pub use` re-export. It is known by that public path.
//! Its fields are classified by their visibility keyword:
//!
//! - `pub` (or any other explicit visibility): a Prop, supplied by the spec
//! - inherited visibility: State, owned by the mounted instance
//! - a field of the runtime's `Instance` type: the attach point, skipped
//!
//! Analysis is all-or-nothing; any diagnostic aborts the run.

mod check;
pub mod package;
pub mod scope;

pub use package::{Manifest, Package, SourceModule};
pub use scope::{Resolution, SymPath, SymbolTable};

use crate::error::{CodegenError, Diagnostic, Diagnostics, Result};
use crate::model::{Component, Field, FieldKind, ModulePath};
use scope::{Canonicalizer, DeclKind};
use std::collections::BTreeMap;
use std::path::Path;
use syn::ext::IdentExt;
use syn::{Fields, Item, ItemStruct, Type, Visibility};
use tracing::debug;

/// Every public name of the runtime crate.
const RUNTIME_EXPORTS: &[&str] = &[
    "AsAny",
    "ComponentId",
    "Core",
    "Error",
    "Instance",
    "InstanceId",
    "Lifecycle",
    "Occurrence",
    "ReconcileFn",
    "Registry",
    "Result",
    "Scheduler",
    "WeakInstance",
];

/// Components found in one package.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Crate name of the analyzed package.
    pub crate_name: String,
    /// Every component, sorted by name then module path.
    pub components: Vec<Component>,
}

impl Analysis {
    /// Path of the analyzed crate's root module.
    pub fn root(&self) -> ModulePath {
        ModulePath::root(&self.crate_name)
    }

    /// Components that carry an instance field.
    pub fn mountable(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().filter(|c| c.is_mountable())
    }
}

/// Loads and classifies the components of a package.
#[derive(Debug, Clone)]
pub struct PackageAnalyzer {
    runtime: String,
}

impl PackageAnalyzer {
    /// Create a new analyzer; `runtime` is the crate providing `Instance`.
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
        }
    }

    /// Analyze the package at `path`, a crate directory or its `Cargo.toml`.
    pub fn analyze(&self, path: &Path) -> Result<Analysis> {
        let package = Package::load(path)?;
        let table = SymbolTable::new(&package)
            .with_exports(&self.runtime, RUNTIME_EXPORTS.iter().copied());

        let mut diagnostics = package.syntax_errors.clone();
        check::unresolved_names(&package, &table, &mut diagnostics);
        check::alias_cycles(&package, &table, &mut diagnostics);
        check::recursive_types(&package, &table, &mut diagnostics);

        let components = self.discover(&package, &table, &mut diagnostics);
        duplicate_names(&package, &components, &mut diagnostics);

        if !diagnostics.is_empty() {
            return Err(CodegenError::TypeCheck(Diagnostics(diagnostics)));
        }

        debug!(
            krate = %package.manifest.crate_name,
            components = components.len(),
            "analysis complete"
        );
        Ok(Analysis {
            crate_name: package.manifest.crate_name,
            components,
        })
    }

    fn discover(
        &self,
        package: &Package,
        table: &SymbolTable,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Component> {
        let mut components = Vec::new();
        for (index, module) in package.modules.iter().enumerate() {
            for item in &module.items {
                let Item::Struct(decl) = item else { continue };
                if !matches!(decl.vis, Visibility::Public(_)) {
                    continue;
                }
                let name = decl.ident.unraw().to_string();
                if !decl.generics.params.is_empty() {
                    debug!(component = %name, module = %module.path, "skipping generic struct");
                    continue;
                }
                if matches!(decl.fields, Fields::Unnamed(_)) {
                    debug!(component = %name, module = %module.path, "skipping tuple struct");
                    continue;
                }

                let (mut component, mut problems) = self.classify(package, table, index, decl);
                match table.public_path(index, &name) {
                    Some(mut path) => {
                        // A re-export may rename the struct.
                        if let Some(public_name) = path.pop() {
                            component.name = public_name;
                        }
                        component.module = ModulePath::from_segments(path);
                    }
                    None if component.is_mountable() => problems.insert(
                        0,
                        "not reachable from outside the crate; declare it in a public module \
                         or re-export it with `pub use`"
                            .to_string(),
                    ),
                    None => {
                        debug!(
                            component = %name,
                            module = %module.path,
                            "skipping unreachable struct"
                        );
                        continue;
                    }
                }

                if !component.is_mountable() {
                    debug!(
                        component = %component.name,
                        module = %component.module,
                        "no instance field"
                    );
                } else if !problems.is_empty() {
                    for problem in problems {
                        diagnostics.push(Diagnostic::new(
                            &module.file,
                            format!("component `{}::{name}`: {problem}", module.path),
                        ));
                    }
                    continue;
                }
                components.push(component);
            }
        }

        components.sort_by(|a, b| (&a.name, &a.module).cmp(&(&b.name, &b.module)));
        components
    }

    /// Split the fields of `decl` into props and state, collecting the
    /// problems that would stop it from being mounted.
    fn classify(
        &self,
        package: &Package,
        table: &SymbolTable,
        module: usize,
        decl: &ItemStruct,
    ) -> (Component, Vec<String>) {
        let name = decl.ident.unraw().to_string();
        let context = check::context_for(table, module, &name, &decl.generics);

        let mut component = Component {
            name,
            module: package.modules[module].path.clone(),
            instance: None,
            props: Vec::new(),
            state: Vec::new(),
        };
        let mut problems = Vec::new();

        for field in &decl.fields {
            let Some(ident) = field.ident.clone() else { continue };
            if self.is_instance(package, table, module, &field.ty, 0) {
                if component.instance.is_some() {
                    debug!(
                        component = %component.name,
                        field = %ident,
                        "ignoring extra instance field"
                    );
                } else {
                    if !matches!(field.vis, Visibility::Public(_)) {
                        problems.push(format!("instance field `{ident}` must be `pub`"));
                    }
                    component.instance = Some(ident);
                }
                continue;
            }

            let mut canonicalizer = Canonicalizer::new(table, module, &context);
            let ty = canonicalizer.rewrite(&field.ty);
            for private in canonicalizer.private {
                problems.push(format!(
                    "field `{ident}` has type `{private}`, \
                     which is not reachable from outside the crate"
                ));
            }
            for form in canonicalizer.unsupported {
                problems.push(format!(
                    "field `{ident}` uses {form}, which generated code cannot name"
                ));
            }

            let kind = match &field.vis {
                Visibility::Inherited => FieldKind::State,
                Visibility::Public(_) => FieldKind::Prop,
                Visibility::Restricted(_) => {
                    problems.push(format!(
                        "prop `{ident}` has restricted visibility; generated code needs it `pub`"
                    ));
                    FieldKind::Prop
                }
            };
            let field = Field { ident, ty, kind };
            match kind {
                FieldKind::Prop => component.props.push(field),
                FieldKind::State => component.state.push(field),
            }
        }

        (component, problems)
    }

    /// Whether `ty` names the runtime's `Instance`, directly or through local aliases.
    fn is_instance(
        &self,
        package: &Package,
        table: &SymbolTable,
        module: usize,
        ty: &Type,
        depth: usize,
    ) -> bool {
        let Type::Path(path) = ty else { return false };
        if path.qself.is_some() || depth > 8 {
            return false;
        }
        match table.resolve(module, &SymPath::from_syn(&path.path)) {
            Some(Resolution::External(segments)) => {
                segments.len() == 2 && segments[0] == self.runtime && segments[1] == "Instance"
            }
            Some(Resolution::Local(local)) if local.decl.kind == DeclKind::Alias => {
                match package.modules[local.module].items.get(local.decl.item) {
                    Some(Item::Type(alias)) if alias.generics.params.is_empty() => {
                        self.is_instance(package, table, local.module, &alias.ty, depth + 1)
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

fn duplicate_names(package: &Package, components: &[Component], diagnostics: &mut Vec<Diagnostic>) {
    let mut by_name: BTreeMap<&str, Vec<&ModulePath>> = BTreeMap::new();
    for component in components.iter().filter(|c| c.is_mountable()) {
        by_name
            .entry(component.name.as_str())
            .or_default()
            .push(&component.module);
    }
    for (name, modules) in by_name {
        if modules.len() > 1 {
            let places: Vec<String> = modules.iter().map(|m| format!("`{m}`")).collect();
            diagnostics.push(Diagnostic::new(
                &package.root().file,
                format!("component name `{name}` is declared in {}", places.join(" and ")),
            ));
        }
    }
}
