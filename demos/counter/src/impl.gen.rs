// GENERATED, DO NOT CHANGE

#[allow(unused_imports, clippy::single_component_path_imports)]
use counter_spec;
#[allow(unused_imports, clippy::single_component_path_imports)]
use graft_core;
#[allow(unused_imports, clippy::single_component_path_imports)]
use std::collections;
/// Wires every generated reconcile function into `registry`.
pub fn register(registry: &mut graft_core::Registry) {
    registry.register::<counter_spec::Counter>(reconcile_counter);
    registry.register::<counter_spec::TodoList>(reconcile_todo_list);
}
/// Props of `Counter`, supplied by every spec and read-only to the instance.
pub trait CounterProps {
    fn label(&self) -> &String;
}
/// State owned by a mounted `Counter`; every setter requests a re-render.
pub trait CounterState {
    fn count(&self) -> &i64;
    fn set_count(&mut self, value: i64);
}
/// Backing storage for one mounted `Counter`.
pub struct CounterCore {
    __core: graft_core::Core,
    label: String,
    count: i64,
}
impl CounterCore {
    fn new(core: graft_core::Core) -> Self {
        Self {
            __core: core,
            label: Default::default(),
            count: Default::default(),
        }
    }
}
impl CounterProps for CounterCore {
    fn label(&self) -> &String {
        &self.label
    }
}
impl CounterState for CounterCore {
    fn count(&self) -> &i64 {
        &self.count
    }
    fn set_count(&mut self, value: i64) {
        self.count = value;
        self.__core.update();
    }
}
/// A mounted `Counter`; implement `graft_core::Lifecycle` for it to render.
pub struct CounterImpl {
    core: CounterCore,
}
impl CounterImpl {
    /// Props applied by the latest reconciliation.
    pub fn props(&self) -> &dyn CounterProps {
        &self.core
    }
    /// Current state.
    pub fn state(&self) -> &dyn CounterState {
        &self.core
    }
    /// Mutable state; every setter requests a re-render.
    pub fn state_mut(&mut self) -> &mut dyn CounterState {
        &mut self.core
    }
    /// Runtime handle of this instance.
    pub fn core(&self) -> &graft_core::Core {
        &self.core.__core
    }
    fn apply_props(&mut self, spec: &counter_spec::Counter) {
        self.core.label = spec.label.clone();
        graft_core::Lifecycle::render(self);
    }
}
/// Reconciles a `Counter` spec against the occurrence it supersedes.
///
/// Mounts a fresh instance unless `old` was produced by a `Counter` spec, in
/// which case that instance is reused and only its props are re-applied.
pub fn reconcile_counter(
    scheduler: &graft_core::Scheduler,
    new_spec: &mut counter_spec::Counter,
    old: Option<&graft_core::Occurrence>,
) -> Result<graft_core::Occurrence, graft_core::Error> {
    let component = graft_core::ComponentId::of::<counter_spec::Counter>();
    if let Some(prior) = old.filter(|prior| prior.component() == component) {
        let instance = prior.instance().clone();
        new_spec.instance = instance.clone();
        instance.with(|inst: &mut CounterImpl| inst.apply_props(new_spec))?;
        return Ok(graft_core::Occurrence::new(component, instance));
    }
    let instance = graft_core::Instance::mount(
        component,
        |handle| CounterImpl {
            core: CounterCore::new(graft_core::Core::new(scheduler, handle)),
        },
    );
    new_spec.instance = instance.clone();
    instance.with(|inst: &mut CounterImpl| graft_core::Lifecycle::will_mount(inst))?;
    instance.with(|inst: &mut CounterImpl| inst.apply_props(new_spec))?;
    instance.with(|inst: &mut CounterImpl| graft_core::Lifecycle::did_mount(inst))?;
    Ok(graft_core::Occurrence::new(component, instance))
}
/// Props of `TodoList`, supplied by every spec and read-only to the instance.
pub trait TodoListProps {
    fn title(&self) -> &String;
    fn theme(&self) -> &counter_spec::Theme;
}
/// State owned by a mounted `TodoList`; every setter requests a re-render.
pub trait TodoListState {
    fn items(&self) -> &Vec<String>;
    fn set_items(&mut self, value: Vec<String>);
    fn done(&self) -> &collections::BTreeMap<usize, bool>;
    fn set_done(&mut self, value: collections::BTreeMap<usize, bool>);
}
/// Backing storage for one mounted `TodoList`.
pub struct TodoListCore {
    __core: graft_core::Core,
    title: String,
    theme: counter_spec::Theme,
    items: Vec<String>,
    done: collections::BTreeMap<usize, bool>,
}
impl TodoListCore {
    fn new(core: graft_core::Core) -> Self {
        Self {
            __core: core,
            title: Default::default(),
            theme: Default::default(),
            items: Default::default(),
            done: Default::default(),
        }
    }
}
impl TodoListProps for TodoListCore {
    fn title(&self) -> &String {
        &self.title
    }
    fn theme(&self) -> &counter_spec::Theme {
        &self.theme
    }
}
impl TodoListState for TodoListCore {
    fn items(&self) -> &Vec<String> {
        &self.items
    }
    fn set_items(&mut self, value: Vec<String>) {
        self.items = value;
        self.__core.update();
    }
    fn done(&self) -> &collections::BTreeMap<usize, bool> {
        &self.done
    }
    fn set_done(&mut self, value: collections::BTreeMap<usize, bool>) {
        self.done = value;
        self.__core.update();
    }
}
/// A mounted `TodoList`; implement `graft_core::Lifecycle` for it to render.
pub struct TodoListImpl {
    core: TodoListCore,
}
impl TodoListImpl {
    /// Props applied by the latest reconciliation.
    pub fn props(&self) -> &dyn TodoListProps {
        &self.core
    }
    /// Current state.
    pub fn state(&self) -> &dyn TodoListState {
        &self.core
    }
    /// Mutable state; every setter requests a re-render.
    pub fn state_mut(&mut self) -> &mut dyn TodoListState {
        &mut self.core
    }
    /// Runtime handle of this instance.
    pub fn core(&self) -> &graft_core::Core {
        &self.core.__core
    }
    fn apply_props(&mut self, spec: &counter_spec::TodoList) {
        self.core.title = spec.title.clone();
        self.core.theme = spec.theme.clone();
        graft_core::Lifecycle::render(self);
    }
}
/// Reconciles a `TodoList` spec against the occurrence it supersedes.
///
/// Mounts a fresh instance unless `old` was produced by a `TodoList` spec, in
/// which case that instance is reused and only its props are re-applied.
pub fn reconcile_todo_list(
    scheduler: &graft_core::Scheduler,
    new_spec: &mut counter_spec::TodoList,
    old: Option<&graft_core::Occurrence>,
) -> Result<graft_core::Occurrence, graft_core::Error> {
    let component = graft_core::ComponentId::of::<counter_spec::TodoList>();
    if let Some(prior) = old.filter(|prior| prior.component() == component) {
        let instance = prior.instance().clone();
        new_spec.instance = instance.clone();
        instance.with(|inst: &mut TodoListImpl| inst.apply_props(new_spec))?;
        return Ok(graft_core::Occurrence::new(component, instance));
    }
    let instance = graft_core::Instance::mount(
        component,
        |handle| TodoListImpl {
            core: TodoListCore::new(graft_core::Core::new(scheduler, handle)),
        },
    );
    new_spec.instance = instance.clone();
    instance.with(|inst: &mut TodoListImpl| graft_core::Lifecycle::will_mount(inst))?;
    instance.with(|inst: &mut TodoListImpl| inst.apply_props(new_spec))?;
    instance.with(|inst: &mut TodoListImpl| graft_core::Lifecycle::did_mount(inst))?;
    Ok(graft_core::Occurrence::new(component, instance))
}
