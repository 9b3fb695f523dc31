//! End-to-end generation over real and scratch packages.

use graft_codegen::{generate, CodegenError, ErrorClass, GenerateOptions, PackageAnalyzer};
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn workspace_path(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..").join(rel)
}

/// A throwaway package whose library root is `lib`.
fn scratch(lib: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("Cargo.toml"),
        indoc! {r#"
            [package]
            name = "scratch"
            version = "0.1.0"
            edition = "2021"

            [dependencies]
            graft-core = { path = "../graft-core" }
        "#},
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/lib.rs"), lib).unwrap();
    dir
}

fn add_module(dir: &TempDir, rel: &str, text: &str) {
    let path = dir.path().join("src").join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn generate_scratch(dir: &TempDir) -> String {
    generate(dir.path(), &GenerateOptions::default())
        .unwrap()
        .source
}

fn type_check_messages(dir: &TempDir) -> Vec<String> {
    let err = generate(dir.path(), &GenerateOptions::default()).unwrap_err();
    assert_eq!(err.class(), ErrorClass::TypeCheck, "{err}");
    err.diagnostics()
        .unwrap()
        .0
        .iter()
        .map(|d| d.message.clone())
        .collect()
}

/// Reprint through the formatter so layout-dependent trailing commas cannot differ.
fn normalize(source: &str) -> String {
    prettyplease::unparse(&syn::parse_file(source).unwrap())
}

#[test]
fn test_counter_demo_matches_checked_in_artifact() {
    let generated =
        generate(workspace_path("demos/counter-spec"), &GenerateOptions::default()).unwrap();
    let checked_in = fs::read_to_string(workspace_path("demos/counter/src/impl.gen.rs")).unwrap();

    assert_eq!(generated.file_name, "impl.gen.rs");
    assert_eq!(generated.components, vec!["Counter", "TodoList"]);
    assert!(generated.source.starts_with("// GENERATED, DO NOT CHANGE\n\n"));
    assert_eq!(normalize(&generated.source), normalize(&checked_in));
}

#[test]
fn test_generation_is_idempotent() {
    let spec = workspace_path("demos/counter-spec/Cargo.toml");
    let first = generate(&spec, &GenerateOptions::default()).unwrap();
    let second = generate(&spec, &GenerateOptions::default()).unwrap();
    assert_eq!(first.source, second.source);
}

#[test]
fn test_counter_demo_classification() {
    let analysis = PackageAnalyzer::new("graft_core")
        .analyze(&workspace_path("demos/counter-spec"))
        .unwrap();

    let names: Vec<&str> = analysis.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Counter", "Theme", "TodoList"]);

    let counter = &analysis.components[0];
    assert_eq!(counter.instance.as_ref().unwrap().to_string(), "instance");
    assert_eq!(counter.props.len(), 1);
    assert_eq!(counter.props[0].name(), "label");
    assert_eq!(counter.state.len(), 1);
    assert_eq!(counter.state[0].name(), "count");

    let theme = &analysis.components[1];
    assert!(!theme.is_mountable());
    assert_eq!(theme.props.len(), 2);
}

#[test]
fn test_missing_package_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let err = generate(dir.path().join("nope"), &GenerateOptions::default()).unwrap_err();
    assert_eq!(err.class(), ErrorClass::Load);
}

#[test]
fn test_missing_library_root_is_a_load_error() {
    let dir = scratch("");
    fs::remove_file(dir.path().join("src/lib.rs")).unwrap();
    let err = generate(dir.path(), &GenerateOptions::default()).unwrap_err();
    assert!(matches!(err, CodegenError::Load { .. }));
}

#[test]
fn test_syntax_error_is_a_type_check_error() {
    let dir = scratch("pub struct Broken { pub a: }");
    let messages = type_check_messages(&dir);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("syntax error"));
}

#[test]
fn test_every_problem_is_reported() {
    let dir = scratch(indoc! {r#"
        use graft_core::Instance;

        pub struct Card {
            pub instance: Instance,
            pub body: Missing,
        }

        type Loop = Vec<Loop>;

        pub struct Chain {
            next: Option<Chain>,
        }
    "#});
    let messages = type_check_messages(&dir);
    assert_eq!(
        messages,
        vec![
            "cannot find type `Missing` used by `scratch::Card`",
            "type alias `scratch::Loop` expands to itself",
            "recursive type `scratch::Chain` has infinite size",
        ]
    );
}

#[test]
fn test_private_field_type_is_rejected() {
    let dir = scratch(indoc! {r#"
        mod detail {
            pub struct Hidden;
        }

        pub struct Panel {
            pub instance: graft_core::Instance,
            pub content: detail::Hidden,
        }
    "#});
    let messages = type_check_messages(&dir);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("`Hidden`, which is not reachable"), "{messages:?}");
}

#[test]
fn test_restricted_prop_is_rejected() {
    let dir = scratch(indoc! {r#"
        pub struct Panel {
            pub instance: graft_core::Instance,
            pub(crate) title: String,
        }
    "#});
    let messages = type_check_messages(&dir);
    assert_eq!(
        messages,
        vec![
            "component `scratch::Panel`: prop `title` has restricted visibility; \
             generated code needs it `pub`"
        ]
    );
}

#[test]
fn test_duplicate_component_names() {
    let dir = scratch("pub mod a;\npub mod b;\n");
    let body = "pub struct Item { pub instance: graft_core::Instance }\n";
    add_module(&dir, "a.rs", body);
    add_module(&dir, "b.rs", body);
    let messages = type_check_messages(&dir);
    assert_eq!(
        messages,
        vec!["component name `Item` is declared in `scratch::a` and `scratch::b`"]
    );
}

#[test]
fn test_instance_through_alias_and_rename() {
    let dir = scratch(indoc! {r#"
        use graft_core::Instance as Handle;

        pub type Slot = Handle;

        pub struct Direct {
            pub slot: Slot,
            pub r#type: String,
            hits: u32,
        }

        pub struct Renamed {
            pub handle: Handle,
        }
    "#});
    let source = generate_scratch(&dir);
    assert!(source.contains("new_spec.slot = instance.clone();"));
    assert!(source.contains("new_spec.handle = instance.clone();"));
    assert!(source.contains("fn r#type(&self) -> &String;"));
    assert!(source.contains("fn set_hits(&mut self, value: u32);"));
    assert!(!source.contains("Slot"));
}

#[test]
fn test_skipped_structs() {
    let dir = scratch(indoc! {r#"
        use graft_core::Instance;

        pub struct Tuple(pub Instance);

        pub struct Generic<T> {
            pub instance: Instance,
            pub value: T,
        }

        struct Private {
            pub instance: Instance,
        }

        mod internal {
            pub struct Settings {
                pub verbose: bool,
            }
        }

        pub struct Kept {
            pub instance: Instance,
        }
    "#});
    let generated = generate(dir.path(), &GenerateOptions::default()).unwrap();
    assert_eq!(generated.components, vec!["Kept"]);
}

#[test]
fn test_component_behind_reexport() {
    let dir = scratch(indoc! {r#"
        mod counter;
        mod badge;

        pub use badge::Badge as Pill;
        pub use counter::Counter;
    "#});
    add_module(
        &dir,
        "counter.rs",
        "pub struct Counter { pub instance: graft_core::Instance, pub label: String, count: i64 }\n",
    );
    add_module(
        &dir,
        "badge.rs",
        "pub struct Badge { pub instance: graft_core::Instance, pub text: String }\n",
    );

    let generated = generate(dir.path(), &GenerateOptions::default()).unwrap();
    assert_eq!(generated.components, vec!["Counter", "Pill"]);
    assert!(generated.source.contains("use scratch;\n"));
    assert!(!generated.source.contains("scratch::counter"));
    assert!(generated
        .source
        .contains("registry.register::<scratch::Counter>(reconcile_counter);"));
    assert!(generated.source.contains("pub fn reconcile_pill("));
    assert!(generated.source.contains("fn set_count(&mut self, value: i64);"));
}

#[test]
fn test_unreachable_component_is_rejected() {
    let dir = scratch(indoc! {r#"
        mod internal {
            pub struct Hidden {
                pub instance: graft_core::Instance,
            }
        }
    "#});
    let messages = type_check_messages(&dir);
    assert_eq!(
        messages,
        vec![
            "component `scratch::internal::Hidden`: not reachable from outside the crate; \
             declare it in a public module or re-export it with `pub use`"
        ]
    );
}

#[test]
fn test_instance_through_runtime_glob() {
    let dir = scratch(indoc! {r#"
        use std::collections::*;
        use graft_core::*;

        pub struct Counter {
            pub instance: Instance,
            pub label: String,
            seen: HashMap<String, u32>,
        }
    "#});
    let source = generate_scratch(&dir);
    assert!(source.contains("new_spec.instance = instance.clone();"));
    assert!(source.contains("fn seen(&self) -> &collections::HashMap<String, u32>;"));
}

#[test]
fn test_nested_modules_and_import_aliases() {
    let dir = scratch(indoc! {r#"
        pub mod fmt;
        pub mod widgets;
    "#});
    add_module(&dir, "fmt.rs", "#[derive(Clone, Default)]\npub struct Style;\n");
    add_module(
        &dir,
        "widgets/mod.rs",
        indoc! {r#"
            use crate::fmt::Style;

            pub struct Label {
                pub instance: graft_core::Instance,
                pub style: Style,
                pub written: std::fmt::Arguments<'static>,
            }
        "#},
    );

    let source = generate_scratch(&dir);
    assert!(source.contains("use scratch::fmt;\n"), "{source}");
    assert!(source.contains("use std::fmt as fmt_2;\n"), "{source}");
    assert!(source.contains("use scratch::widgets;\n"), "{source}");
    assert!(source.contains("fn style(&self) -> &fmt::Style;"));
    assert!(source.contains("fn written(&self) -> &fmt_2::Arguments<'static>;"));
    assert!(source.contains("new_spec: &mut widgets::Label,"));
}

#[test]
fn test_package_dependency_rename() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("Cargo.toml"),
        indoc! {r#"
            [package]
            name = "renamed-dep"
            version = "0.1.0"

            [dependencies]
            ui = { package = "graft-core", path = "../graft-core" }
        "#},
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/lib.rs"),
        "pub struct Button { pub instance: ui::Instance, pub text: String }\n",
    )
    .unwrap();

    let generated = generate(dir.path(), &GenerateOptions::default()).unwrap();
    assert_eq!(generated.components, vec!["Button"]);
    assert!(generated.source.contains("use renamed_dep;\n"));
}
