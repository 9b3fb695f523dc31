//! Lifecycle hooks implemented by user code on generated implementations.

use std::any::Any;

/// Downcasting support for trait objects stored inside an [`Instance`].
///
/// Blanket-implemented for every `'static` type; never implement it by hand.
///
/// [`Instance`]: crate::Instance
#[doc(hidden)]
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Hooks the reconciler calls on a mounted component.
///
/// Implemented by user code for every generated `<Name>Impl`. On mount the
/// order is always `will_mount`, one `render`, `did_mount`; updates only
/// render.
pub trait Lifecycle: AsAny {
    /// Called once, before the first render.
    fn will_mount(&mut self) {}

    /// Called once, after the first render.
    fn did_mount(&mut self) {}

    /// Produce this component's output for the host runtime.
    fn render(&mut self);
}
