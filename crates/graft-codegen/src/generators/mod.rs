//! Code synthesis: render the component template, then format the result.

mod templates;

pub use templates::TemplateEngine;

use crate::error::{CodegenError, Result};
use crate::imports::ImportSet;
use crate::model::{self, Component, Field};
use serde::Serialize;
use tracing::debug;

/// First line of every artifact.
pub const HEADER: &str = "// GENERATED, DO NOT CHANGE";

const COMPONENT_TEMPLATE: &str = "component";

/// Everything the template sees.
#[derive(Debug, Serialize)]
struct ArtifactView {
    runtime: String,
    imports: Vec<ImportView>,
    components: Vec<ComponentView>,
}

#[derive(Debug, Serialize)]
struct ImportView {
    path: String,
    alias: String,
    renamed: bool,
}

#[derive(Debug, Serialize)]
struct ComponentView {
    name: String,
    /// Spec type qualified by its module alias.
    spec: String,
    /// Name of the spec field the instance handle is attached to.
    instance: String,
    runtime: String,
    props: Vec<FieldView>,
    state: Vec<FieldView>,
}

#[derive(Debug, Serialize)]
struct FieldView {
    /// Identifier as declared, raw prefix included.
    field: String,
    /// Identifier without a raw prefix, for derived names such as setters.
    name: String,
    ty: String,
}

/// Renders reconcilers for a set of components.
pub struct CodeSynthesizer<'a> {
    engine: TemplateEngine<'a>,
    runtime: String,
}

impl<'a> CodeSynthesizer<'a> {
    /// Create a new synthesizer emitting paths into the `runtime` crate.
    pub fn new(runtime: impl Into<String>) -> Result<Self> {
        let mut engine = TemplateEngine::new();
        engine.register_template(COMPONENT_TEMPLATE, include_str!("component.rs.hbs"))?;
        Ok(Self {
            engine,
            runtime: runtime.into(),
        })
    }

    /// Render and format the artifact; components without an instance field are skipped.
    pub fn synthesize(&self, components: &[&Component], imports: &ImportSet) -> Result<String> {
        let view = ArtifactView {
            runtime: self.runtime.clone(),
            imports: imports
                .imports()
                .into_iter()
                .map(|import| ImportView {
                    path: import
                        .path
                        .segments()
                        .iter()
                        .map(|segment| model::ident(segment).to_string())
                        .collect::<Vec<_>>()
                        .join("::"),
                    alias: model::ident(&import.alias).to_string(),
                    renamed: import.is_renamed(),
                })
                .collect(),
            components: components
                .iter()
                .filter_map(|component| self.component_view(component, imports))
                .collect(),
        };

        let raw = self.engine.render(COMPONENT_TEMPLATE, &view)?;
        let formatted = format_source(&raw)?;
        Ok(format!("{HEADER}\n\n{formatted}"))
    }

    fn component_view(&self, component: &Component, imports: &ImportSet) -> Option<ComponentView> {
        let Some(instance) = &component.instance else {
            debug!(component = %component.name, "no instance field, not synthesized");
            return None;
        };
        let name = model::ident(&component.name).to_string();
        let spec = match imports.alias(&component.module) {
            Some(alias) => format!("{}::{name}", model::ident(alias)),
            None => format!("::{}::{name}", component.module),
        };
        let field_view = |field: &Field| FieldView {
            field: field.ident.to_string(),
            name: field.name(),
            ty: render_type(&imports.qualify(&field.ty)),
        };

        Some(ComponentView {
            name,
            spec,
            instance: instance.to_string(),
            runtime: self.runtime.clone(),
            props: component.props.iter().map(field_view).collect(),
            state: component.state.iter().map(field_view).collect(),
        })
    }
}

fn render_type(ty: &syn::Type) -> String {
    quote::quote!(#ty).to_string()
}

/// Parse rendered source and pretty-print it.
fn format_source(source: &str) -> Result<String> {
    let file =
        syn::parse_file(source).map_err(|err| CodegenError::FormattingError(err.to_string()))?;
    Ok(prettyplease::unparse(&file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::ImportResolver;
    use crate::model::{FieldKind, ModulePath};

    fn field(name: &str, ty: &str, kind: FieldKind) -> Field {
        Field {
            ident: model::ident(name),
            ty: syn::parse_str(ty).unwrap(),
            kind,
        }
    }

    fn widget(props: Vec<Field>, state: Vec<Field>) -> Component {
        Component {
            name: "Widget".to_string(),
            module: ModulePath::root("app"),
            instance: Some(model::ident("instance")),
            props,
            state,
        }
    }

    fn synthesize(components: &[&Component]) -> String {
        let imports = ImportResolver::new("graft_core", ModulePath::root("app"))
            .resolve(components.iter().copied());
        CodeSynthesizer::new("graft_core")
            .unwrap()
            .synthesize(components, &imports)
            .unwrap()
    }

    #[test]
    fn test_header_and_formatting() {
        let component = widget(vec![field("label", "String", FieldKind::Prop)], vec![]);
        let source = synthesize(&[&component]);
        assert!(source.starts_with("// GENERATED, DO NOT CHANGE\n\n#[allow("));
        assert!(source.contains("pub fn reconcile_widget(\n"));
        assert!(source.contains("    fn label(&self) -> &String;\n"));
    }

    #[test]
    fn test_raw_identifiers() {
        let component = widget(
            vec![field("type", "String", FieldKind::Prop)],
            vec![field("match", "u8", FieldKind::State)],
        );
        let source = synthesize(&[&component]);
        assert!(source.contains("fn r#type(&self) -> &String;"));
        assert!(source.contains("fn set_match(&mut self, value: u8);"));
        assert!(source.contains("self.core.r#type = spec.r#type.clone();"));
    }

    #[test]
    fn test_component_without_props_or_state() {
        let component = widget(vec![], vec![]);
        let source = synthesize(&[&component]);
        assert!(source.contains("fn apply_props(&mut self, _spec: &app::Widget)"));
        syn::parse_file(&source).unwrap();
    }

    #[test]
    fn test_unmountable_components_are_skipped() {
        let mut theme = widget(vec![field("accent", "String", FieldKind::Prop)], vec![]);
        theme.name = "Theme".to_string();
        theme.instance = None;
        let source = synthesize(&[&theme]);
        assert!(!source.contains("ThemeProps"));
        assert!(source.contains("pub fn register(_registry: &mut graft_core::Registry) {}"));
    }

    #[test]
    fn test_malformed_source_is_a_formatting_error() {
        let err = format_source("fn broken( {").unwrap_err();
        assert!(matches!(err, CodegenError::FormattingError(_)));
    }
}
