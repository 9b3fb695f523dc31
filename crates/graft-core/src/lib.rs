//! Runtime support for graft-generated component reconcilers.
//!
//! `graft-gen` turns plain struct declarations into accessor traits, backing
//! storage and one `reconcile_<name>` function per component. The generated
//! code links against this crate for everything that is not component
//! specific.
//!
//! # Architecture
//!
//! 1. **Identity**: [`ComponentId`] names a component type, [`Instance`] names
//!    one mounted occurrence of it. An [`Occurrence`] pairs the two and is what
//!    a reconciled spec leaves behind for the next submission.
//! 2. **Lifecycle**: user code implements [`Lifecycle`] for every generated
//!    `<Name>Impl`; the reconciler calls its hooks in a fixed order.
//! 3. **Rendering**: [`Core`] turns state changes into render requests queued
//!    on a [`Scheduler`]; the host drains the queue with [`Scheduler::flush`].
//! 4. **Dispatch**: a [`Registry`] maps component types to their reconcile
//!    functions so the host's render engine can reconcile heterogeneous specs.
//!
//! Everything here is single threaded (`Rc`/`RefCell`); reconcile calls,
//! setters and flushes for one tree must run on one thread, one at a time.
//!
//! # Example
//!
//! ```ignore
//! let scheduler = Scheduler::new();
//! let mut registry = Registry::new();
//! generated::register(&mut registry);
//!
//! let mut spec = Counter::new("clicks");
//! let first = registry.reconcile(&scheduler, &mut spec, None)?;
//!
//! let mut next = Counter::new("clicks!");
//! let second = registry.reconcile(&scheduler, &mut next, Some(&first))?;
//! assert_eq!(first.instance(), second.instance());
//! ```

mod component;
mod error;
mod instance;
mod lifecycle;
mod registry;
mod scheduler;

pub use component::{ComponentId, Occurrence};
pub use error::{Error, Result};
pub use instance::{Instance, InstanceId, WeakInstance};
pub use lifecycle::{AsAny, Lifecycle};
pub use registry::{ReconcileFn, Registry};
pub use scheduler::{Core, Scheduler};
