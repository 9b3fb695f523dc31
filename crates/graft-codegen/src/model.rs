//! Analysis model: the components found in a package and their fields.

use proc_macro2::Span;
use std::fmt;
use syn::ext::IdentExt;
use syn::Ident;

/// Absolute path of a module, starting with a crate name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    /// Path of a crate root.
    pub fn root(krate: impl Into<String>) -> Self {
        Self(vec![krate.into()])
    }

    /// Build a path from its segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Path of the child module `name`.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Last segment, used as the default import alias.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("::"))
    }
}

/// Whether a field is supplied by the spec or owned by the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Declared with an explicit visibility.
    Prop,
    /// Declared with inherited visibility.
    State,
}

/// A classified field of a component.
#[derive(Debug, Clone)]
pub struct Field {
    /// Identifier as declared, raw prefix included.
    pub ident: Ident,
    /// Field type with every named type rewritten to an absolute path.
    pub ty: syn::Type,
    pub kind: FieldKind,
}

impl Field {
    /// Identifier without a raw prefix, used to build accessor names.
    pub fn name(&self) -> String {
        self.ident.unraw().to_string()
    }
}

/// A component declaration found in the analyzed package.
#[derive(Debug, Clone)]
pub struct Component {
    /// Struct name.
    pub name: String,
    /// Module declaring the struct.
    pub module: ModulePath,
    /// Field holding the runtime instance handle, if any.
    pub instance: Option<Ident>,
    /// Props in declaration order.
    pub props: Vec<Field>,
    /// State in declaration order.
    pub state: Vec<Field>,
}

impl Component {
    /// Only structs with an instance field get a reconciler.
    pub fn is_mountable(&self) -> bool {
        self.instance.is_some()
    }

    /// Props followed by state.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.props.iter().chain(self.state.iter())
    }
}

/// Build an identifier for `name`, falling back to a raw identifier for keywords.
pub(crate) fn ident(name: &str) -> Ident {
    syn::parse_str::<Ident>(name).unwrap_or_else(|_| Ident::new_raw(name, Span::call_site()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_path_display() {
        let path = ModulePath::root("counter_spec").child("widgets");
        assert_eq!(path.to_string(), "counter_spec::widgets");
        assert_eq!(path.last(), Some("widgets"));
    }

    #[test]
    fn test_raw_field_name() {
        let field = Field {
            ident: Ident::new_raw("type", Span::call_site()),
            ty: syn::parse_str("String").unwrap(),
            kind: FieldKind::Prop,
        };
        assert_eq!(field.ident.to_string(), "r#type");
        assert_eq!(field.name(), "type");
    }

    #[test]
    fn test_ident_for_keyword() {
        assert_eq!(ident("match").to_string(), "r#match");
        assert_eq!(ident("label").to_string(), "label");
    }
}
