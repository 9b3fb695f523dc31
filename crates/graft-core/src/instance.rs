//! Opaque instance handles.
//!
//! An [`Instance`] binds one generated implementation (and through it the
//! component's backing storage) to a logical occurrence in the render tree.
//! It is allocated exactly once, by the mount transition, and then travels
//! unchanged from spec to spec for as long as the occurrence persists.
//! Equality is identity: two handles are equal only if they were cloned from
//! the same mount.

use crate::component::ComponentId;
use crate::error::{Error, Result};
use crate::lifecycle::Lifecycle;
use std::any::type_name;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(1) };
}

/// Identifier of a mounted instance, unique within its thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    fn next() -> Self {
        NEXT_ID.with(|next| {
            let id = next.get();
            next.set(id + 1);
            Self(id)
        })
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Slot {
    id: InstanceId,
    component: ComponentId,
    body: RefCell<Box<dyn Lifecycle>>,
}

/// Handle to a mounted component.
///
/// `Instance::default()` is an empty slot, the value a spec carries before
/// its first reconciliation.
#[derive(Clone, Default)]
pub struct Instance {
    slot: Option<Rc<Slot>>,
}

impl Instance {
    /// Allocate a new instance for `component`.
    ///
    /// `build` receives a weak handle to the instance being created so the
    /// implementation can request its own re-renders without keeping itself
    /// alive.
    pub fn mount<T, F>(component: ComponentId, build: F) -> Self
    where
        T: Lifecycle,
        F: FnOnce(WeakInstance) -> T,
    {
        let id = InstanceId::next();
        let slot = Rc::new_cyclic(|weak| {
            let body = build(WeakInstance { slot: weak.clone() });
            Slot {
                id,
                component,
                body: RefCell::new(Box::new(body)),
            }
        });
        tracing::debug!(component = %component, instance = %id, "allocated instance");
        Self { slot: Some(slot) }
    }

    /// Whether this handle refers to a mounted component.
    pub fn is_mounted(&self) -> bool {
        self.slot.is_some()
    }

    /// Identifier of the mounted instance.
    pub fn id(&self) -> Option<InstanceId> {
        self.slot.as_ref().map(|slot| slot.id)
    }

    /// Component type this instance was mounted for.
    pub fn component(&self) -> Option<ComponentId> {
        self.slot.as_ref().map(|slot| slot.component)
    }

    /// Non-owning handle to the same instance.
    pub fn downgrade(&self) -> WeakInstance {
        WeakInstance {
            slot: self.slot.as_ref().map(Rc::downgrade).unwrap_or_default(),
        }
    }

    /// Run `f` against the implementation stored in this instance.
    pub fn with<T, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R>
    where
        T: Lifecycle,
    {
        let slot = self.slot.as_ref().ok_or(Error::Detached)?;
        let mut body = slot.body.try_borrow_mut().map_err(|_| Error::Busy(slot.id))?;
        let body: &mut dyn Lifecycle = &mut **body;
        let target = body
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| Error::Mismatch {
                instance: slot.id,
                component: slot.component.name(),
                expected: type_name::<T>(),
            })?;
        Ok(f(target))
    }

    /// Render the instance now.
    pub fn render(&self) -> Result<()> {
        let slot = self.slot.as_ref().ok_or(Error::Detached)?;
        let mut body = slot.body.try_borrow_mut().map_err(|_| Error::Busy(slot.id))?;
        tracing::trace!(component = %slot.component, instance = %slot.id, "render");
        body.render();
        Ok(())
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        match (&self.slot, &other.slot) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for Instance {}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(slot) => write!(f, "Instance({} {})", slot.id, slot.component),
            None => f.write_str("Instance(unmounted)"),
        }
    }
}

/// Non-owning instance handle held by an instance's own storage.
#[derive(Clone, Default)]
pub struct WeakInstance {
    slot: Weak<Slot>,
}

impl WeakInstance {
    /// Recover a strong handle if the instance is still referenced.
    pub fn upgrade(&self) -> Option<Instance> {
        self.slot.upgrade().map(|slot| Instance { slot: Some(slot) })
    }
}

impl fmt::Debug for WeakInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(instance) => write!(f, "Weak{instance:?}"),
            None => f.write_str("WeakInstance(dropped)"),
        }
    }
}
