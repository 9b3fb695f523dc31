//! Component declarations for the counter demo.
//!
//! Each struct carrying a [`graft_core::Instance`] is a component: its
//! `pub` fields are props supplied on every submission, its private fields
//! are state owned by the mounted instance. Run `graft-gen` on this package
//! to regenerate `demos/counter/src/impl.gen.rs`.

use graft_core::Instance;
use std::collections::BTreeMap;

/// A labelled click counter.
#[derive(Debug, Default)]
pub struct Counter {
    pub instance: Instance,
    pub label: String,
    #[allow(dead_code)]
    count: i64,
}

impl Counter {
    /// Spec for a counter showing `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

/// Visual settings shared by several components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Theme {
    pub accent: String,
    pub compact: bool,
}

/// A titled list of items that can be checked off.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct TodoList {
    pub instance: Instance,
    pub title: String,
    pub theme: Theme,
    items: Vec<String>,
    done: BTreeMap<usize, bool>,
}

impl TodoList {
    /// Spec for a list titled `title`.
    pub fn new(title: impl Into<String>, theme: Theme) -> Self {
        Self {
            title: title.into(),
            theme,
            ..Self::default()
        }
    }
}
