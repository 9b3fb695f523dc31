//! Registry mapping component types to their reconcile functions.

use crate::component::{ComponentId, Occurrence};
use crate::error::{Error, Result};
use crate::scheduler::Scheduler;
use indexmap::IndexMap;
use std::any::{type_name, Any, TypeId};

/// Signature of a generated `reconcile_<name>` function for spec type `S`.
pub type ReconcileFn<S> = fn(&Scheduler, &mut S, Option<&Occurrence>) -> Result<Occurrence>;

type ErasedFn = Box<dyn Fn(&Scheduler, &mut dyn Any, Option<&Occurrence>) -> Result<Occurrence>>;

struct Entry {
    component: ComponentId,
    reconcile: ErasedFn,
}

/// A registry of reconcile functions, keyed by spec type.
///
/// Built once at startup by the generated `register` function and handed
/// to the render engine by reference.
#[derive(Default)]
pub struct Registry {
    entries: IndexMap<TypeId, Entry>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the reconcile function for spec type `S`.
    ///
    /// A later registration for the same type replaces the earlier one.
    pub fn register<S: Any>(&mut self, reconcile: ReconcileFn<S>) {
        let component = ComponentId::of::<S>();
        let erased: ErasedFn = Box::new(
            move |scheduler: &Scheduler, spec: &mut dyn Any, old: Option<&Occurrence>| {
                let spec = spec
                    .downcast_mut::<S>()
                    .ok_or_else(|| Error::Unregistered(type_name::<S>().to_string()))?;
                reconcile(scheduler, spec, old)
            },
        );

        let entry = Entry {
            component,
            reconcile: erased,
        };
        if self.entries.insert(component.type_key(), entry).is_some() {
            tracing::debug!(component = %component, "replaced reconciler");
        }
    }

    /// Reconcile a spec of statically known type.
    pub fn reconcile<S: Any>(
        &self,
        scheduler: &Scheduler,
        spec: &mut S,
        old: Option<&Occurrence>,
    ) -> Result<Occurrence> {
        let entry = self
            .entries
            .get(&TypeId::of::<S>())
            .ok_or_else(|| Error::Unregistered(type_name::<S>().to_string()))?;
        (entry.reconcile)(scheduler, spec, old)
    }

    /// Reconcile a type-erased spec, dispatching on its concrete type.
    pub fn reconcile_dyn(
        &self,
        scheduler: &Scheduler,
        spec: &mut dyn Any,
        old: Option<&Occurrence>,
    ) -> Result<Occurrence> {
        let type_id = (*spec).type_id();
        let entry = self
            .entries
            .get(&type_id)
            .ok_or_else(|| Error::Unregistered(format!("{type_id:?}")))?;
        (entry.reconcile)(scheduler, spec, old)
    }

    /// Check if a reconciler exists for spec type `S`.
    pub fn contains<S: Any>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<S>())
    }

    /// Registered component types, in registration order.
    pub fn components(&self) -> impl Iterator<Item = ComponentId> + '_ {
        self.entries.values().map(|entry| entry.component)
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Instance, Lifecycle};

    #[derive(Default)]
    struct Badge {
        instance: Instance,
        text: String,
    }

    struct BadgeImpl {
        text: String,
        renders: u32,
    }

    impl Lifecycle for BadgeImpl {
        fn render(&mut self) {
            self.renders += 1;
        }
    }

    fn reconcile_badge(
        _scheduler: &Scheduler,
        new_spec: &mut Badge,
        old: Option<&Occurrence>,
    ) -> Result<Occurrence> {
        let component = ComponentId::of::<Badge>();
        let instance = match old.filter(|prior| prior.component() == component) {
            Some(prior) => prior.instance().clone(),
            None => Instance::mount(component, |_| BadgeImpl {
                text: String::new(),
                renders: 0,
            }),
        };
        new_spec.instance = instance.clone();
        instance.with(|badge: &mut BadgeImpl| {
            badge.text = new_spec.text.clone();
            badge.render();
        })?;
        Ok(Occurrence::new(component, instance))
    }

    #[test]
    fn test_registry_new() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains::<Badge>());
    }

    #[test]
    fn test_registry_register() {
        let mut registry = Registry::new();
        registry.register::<Badge>(reconcile_badge);
        registry.register::<Badge>(reconcile_badge);

        assert!(registry.contains::<Badge>());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.components().next(), Some(ComponentId::of::<Badge>()));
    }

    #[test]
    fn test_registry_reconcile_reuses_instance() {
        let mut registry = Registry::new();
        registry.register::<Badge>(reconcile_badge);
        let scheduler = Scheduler::new();

        let mut first = Badge {
            text: "new".into(),
            ..Badge::default()
        };
        let occurrence = registry.reconcile(&scheduler, &mut first, None).unwrap();
        assert_eq!(&first.instance, occurrence.instance());

        let mut second = Badge {
            text: "3".into(),
            ..Badge::default()
        };
        let next = registry
            .reconcile_dyn(&scheduler, &mut second, Some(&occurrence))
            .unwrap();
        assert_eq!(next.instance(), occurrence.instance());

        let (text, renders) = second
            .instance
            .with(|badge: &mut BadgeImpl| (badge.text.clone(), badge.renders))
            .unwrap();
        assert_eq!(text, "3");
        assert_eq!(renders, 2);
    }

    #[test]
    fn test_registry_unregistered() {
        let registry = Registry::new();
        let mut spec = Badge::default();
        let err = registry.reconcile(&Scheduler::new(), &mut spec, None).unwrap_err();
        assert!(matches!(err, Error::Unregistered(name) if name.ends_with("Badge")));
    }
}
