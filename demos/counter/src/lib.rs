//! Counter demo.
//!
//! `impl.gen.rs` is the artifact `graft-gen demos/counter-spec` writes; this
//! file is the hand-written half: the `Lifecycle` impls that decide what a
//! mounted component renders. Rendering here just appends lines to a
//! per-thread journal so the reconciliation order can be observed.

#[path = "impl.gen.rs"]
pub mod generated;

use generated::{CounterImpl, TodoListImpl};
use graft_core::Lifecycle;
use std::cell::RefCell;

pub use generated::register;

thread_local! {
    static JOURNAL: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn record(line: String) {
    JOURNAL.with(|journal| journal.borrow_mut().push(line));
}

/// Drain everything rendered or hooked on this thread so far.
pub fn take_journal() -> Vec<String> {
    JOURNAL.with(|journal| std::mem::take(&mut *journal.borrow_mut()))
}

impl CounterImpl {
    /// Bump the count by one.
    pub fn increment(&mut self) {
        let next = self.state().count() + 1;
        self.state_mut().set_count(next);
    }
}

impl Lifecycle for CounterImpl {
    fn will_mount(&mut self) {
        record("will_mount Counter".to_string());
    }

    fn did_mount(&mut self) {
        record(format!("did_mount Counter {}", self.props().label()));
    }

    fn render(&mut self) {
        record(format!(
            "render {}={}",
            self.props().label(),
            self.state().count()
        ));
    }
}

impl TodoListImpl {
    /// Append an unchecked item.
    pub fn add(&mut self, item: impl Into<String>) {
        let mut items = self.state().items().clone();
        items.push(item.into());
        self.state_mut().set_items(items);
    }

    /// Mark the item at `index` as done.
    pub fn check(&mut self, index: usize) {
        let mut done = self.state().done().clone();
        done.insert(index, true);
        self.state_mut().set_done(done);
    }
}

impl Lifecycle for TodoListImpl {
    fn render(&mut self) {
        let props = self.props();
        let state = self.state();
        let checked = state.done().values().filter(|done| **done).count();
        let marker = if props.theme().compact { " (compact)" } else { "" };
        record(format!(
            "render {}{}: {}/{}",
            props.title(),
            marker,
            checked,
            state.items().len()
        ));
    }
}
