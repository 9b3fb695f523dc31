//! Component type identity and the occurrences reconciliation hands back.

use crate::instance::Instance;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a component type, derived from its spec struct.
///
/// Two ids are equal exactly when they were built from the same Rust type;
/// the name is carried along for diagnostics only.
#[derive(Clone, Copy)]
pub struct ComponentId {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentId {
    /// Identity of the component whose spec type is `S`.
    pub fn of<S: Any>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            name: type_name::<S>(),
        }
    }

    /// Fully qualified name of the spec type.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn type_key(&self) -> TypeId {
        self.type_id
    }
}

impl PartialEq for ComponentId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentId {}

impl Hash for ComponentId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentId").field(&self.name).finish()
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// What a reconciled spec leaves behind: its component type and the
/// instance that now renders it.
///
/// Passing an occurrence back into the next reconcile call for the same
/// logical position is what lets the reconciler reuse the instance.
#[derive(Clone, Debug, PartialEq)]
pub struct Occurrence {
    component: ComponentId,
    instance: Instance,
}

impl Occurrence {
    /// Pair a component identity with its instance.
    pub fn new(component: ComponentId, instance: Instance) -> Self {
        Self {
            component,
            instance,
        }
    }

    /// Component type of the spec that produced this occurrence.
    pub fn component(&self) -> ComponentId {
        self.component
    }

    /// Instance handle bound to this occurrence.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Consume the occurrence, keeping only its instance.
    pub fn into_instance(self) -> Instance {
        self.instance
    }

    /// Whether this occurrence was produced by a spec of type `S`.
    pub fn is<S: Any>(&self) -> bool {
        self.component == ComponentId::of::<S>()
    }
}
