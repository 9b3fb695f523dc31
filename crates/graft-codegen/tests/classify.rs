//! Accessor counts follow field visibility for any mix of fields.

use graft_codegen::{generate, GenerateOptions};
use proptest::prelude::*;
use std::fs;
use syn::{Item, TraitItem};
use tempfile::TempDir;

fn package_with(props: usize, state: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("Cargo.toml"),
        "[package]\nname = \"mixed\"\n\n[dependencies]\ngraft-core = \"0.1\"\n",
    )
    .unwrap();

    let mut fields = vec!["    pub instance: graft_core::Instance,".to_string()];
    fields.extend((0..props).map(|i| format!("    pub prop_{i}: u32,")));
    fields.extend((0..state).map(|i| format!("    state_{i}: Vec<String>,")));
    let lib = format!("pub struct Mixed {{\n{}\n}}\n", fields.join("\n"));

    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/lib.rs"), lib).unwrap();
    dir
}

fn trait_methods(file: &syn::File, name: &str) -> Vec<String> {
    file.items
        .iter()
        .find_map(|item| match item {
            Item::Trait(t) if t.ident == name => Some(
                t.items
                    .iter()
                    .filter_map(|item| match item {
                        TraitItem::Fn(f) => Some(f.sig.ident.to_string()),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn accessor_counts_follow_visibility(props in 0usize..5, state in 0usize..5) {
        let dir = package_with(props, state);
        let generated = generate(dir.path(), &GenerateOptions::default()).unwrap();
        let file = syn::parse_file(&generated.source).unwrap();

        let getters = trait_methods(&file, "MixedProps");
        prop_assert_eq!(getters.len(), props);

        let accessors = trait_methods(&file, "MixedState");
        let setters = accessors.iter().filter(|name| name.starts_with("set_")).count();
        prop_assert_eq!(accessors.len(), 2 * state);
        prop_assert_eq!(setters, state);
    }
}
