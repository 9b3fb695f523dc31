//! Template engine for code generation.

use crate::error::{CodegenError, Result};
use convert_case::{Case, Casing};
use handlebars::Handlebars;
use serde::Serialize;

/// Template engine using Handlebars.
///
/// Output is Rust source, so HTML escaping is off, and strict mode turns a
/// misspelled variable into a render error instead of an empty string.
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Create a new template engine.
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        Self::register_helpers(&mut handlebars);

        Self { handlebars }
    }

    /// Register a template.
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(CodegenError::InvalidTemplate)?;
        Ok(())
    }

    /// Render a template.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.handlebars
            .render(name, data)
            .map_err(CodegenError::TemplateError)
    }

    /// Render a template string directly.
    #[cfg(test)]
    fn render_string<T: Serialize>(&self, template: &str, data: &T) -> Result<String> {
        self.handlebars
            .render_template(template, data)
            .map_err(CodegenError::TemplateError)
    }

    /// Register custom helpers.
    fn register_helpers(handlebars: &mut Handlebars) {
        // Snake case helper, for function names derived from type names
        handlebars.register_helper(
            "snake_case",
            Box::new(
                |h: &handlebars::Helper,
                 _r: &Handlebars,
                 _ctx: &handlebars::Context,
                 _rc: &mut handlebars::RenderContext,
                 out: &mut dyn handlebars::Output| {
                    let param = h
                        .param(0)
                        .and_then(|v| v.value().as_str())
                        .unwrap_or("");
                    out.write(&to_snake_case(param))?;
                    Ok(())
                },
            ),
        );
    }
}

impl<'a> Default for TemplateEngine<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert to snake_case.
fn to_snake_case(s: &str) -> String {
    s.to_case(Case::Snake)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_simple() {
        let mut engine = TemplateEngine::new();
        engine
            .register_template("hello", "fn {{name}}() -> &'static str { \"<b>\" }")
            .unwrap();

        let result = engine.render("hello", &json!({"name": "greet"})).unwrap();
        assert_eq!(result, "fn greet() -> &'static str { \"<b>\" }");
    }

    #[test]
    fn test_values_are_not_escaped() {
        let engine = TemplateEngine::new();
        let result = engine
            .render_string("{{ty}}", &json!({"ty": "Vec<&'a str>"}))
            .unwrap();
        assert_eq!(result, "Vec<&'a str>");
    }

    #[test]
    fn test_snake_case_helper() {
        let engine = TemplateEngine::new();
        let result = engine
            .render_string("reconcile_{{snake_case name}}", &json!({"name": "TodoList"}))
            .unwrap();
        assert_eq!(result, "reconcile_todo_list");
    }

    #[test]
    fn test_strict_mode_rejects_unknown_variables() {
        let engine = TemplateEngine::new();
        let err = engine.render_string("{{missing}}", &json!({})).unwrap_err();
        assert!(matches!(err, CodegenError::TemplateError(_)));
    }
}
