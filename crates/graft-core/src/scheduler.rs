//! Render request queue and the runtime half of generated component storage.

use crate::error::Result;
use crate::instance::{Instance, WeakInstance};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

#[derive(Default)]
struct Queue {
    pending: VecDeque<WeakInstance>,
    requested: u64,
}

/// Queue of render requests for one render tree.
///
/// Cloning yields another handle to the same queue. Requests are recorded
/// one per call, never coalesced; the host drains them with [`flush`].
///
/// [`flush`]: Scheduler::flush
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Rc<RefCell<Queue>>,
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a re-render of `handle`.
    pub fn request(&self, handle: &WeakInstance) {
        let mut queue = self.queue.borrow_mut();
        queue.pending.push_back(handle.clone());
        queue.requested += 1;
        tracing::trace!(pending = queue.pending.len(), "render requested");
    }

    /// Number of requests waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Total number of requests made since the scheduler was created.
    pub fn requested(&self) -> u64 {
        self.queue.borrow().requested
    }

    /// Render every instance with a pending request, in request order.
    ///
    /// Requests made while flushing are kept for the next flush. Requests
    /// for instances that are no longer referenced are discarded. Returns
    /// the number of renders performed.
    ///
    /// If a render fails, the failed request and every request after it stay
    /// queued, ahead of anything requested during this flush.
    pub fn flush(&self) -> Result<usize> {
        let mut batch = std::mem::take(&mut self.queue.borrow_mut().pending);
        let mut rendered = 0;

        while let Some(handle) = batch.pop_front() {
            let Some(instance) = handle.upgrade() else {
                tracing::debug!("discarding render request for an abandoned instance");
                continue;
            };
            if let Err(err) = instance.render() {
                let mut queue = self.queue.borrow_mut();
                batch.push_front(handle);
                batch.append(&mut queue.pending);
                queue.pending = batch;
                return Err(err);
            }
            rendered += 1;
        }

        Ok(rendered)
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("Scheduler")
            .field("pending", &queue.pending.len())
            .field("requested", &queue.requested)
            .finish()
    }
}

/// Runtime state embedded in every generated `<Name>Core`.
///
/// Knows which instance it belongs to and where to send its render
/// requests; generated setters call [`update`](Core::update) after every
/// write.
pub struct Core {
    scheduler: Scheduler,
    handle: WeakInstance,
}

impl Core {
    /// Bind storage to its instance and scheduler.
    pub fn new(scheduler: &Scheduler, handle: WeakInstance) -> Self {
        Self {
            scheduler: scheduler.clone(),
            handle,
        }
    }

    /// Request a re-render of the owning instance.
    pub fn update(&self) {
        self.scheduler.request(&self.handle);
    }

    /// Strong handle to the owning instance, if it is still referenced.
    pub fn instance(&self) -> Option<Instance> {
        self.handle.upgrade()
    }

    /// Scheduler receiving this instance's render requests.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core").field("handle", &self.handle).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ComponentId, Error, Lifecycle};

    struct Ticker {
        core: Core,
        ticks: u32,
        renders: u32,
    }

    impl Ticker {
        fn tick(&mut self) {
            self.ticks += 1;
            self.core.update();
        }
    }

    impl Lifecycle for Ticker {
        fn render(&mut self) {
            self.renders += 1;
        }
    }

    fn mount(scheduler: &Scheduler) -> Instance {
        Instance::mount(ComponentId::of::<Ticker>(), |handle| Ticker {
            core: Core::new(scheduler, handle),
            ticks: 0,
            renders: 0,
        })
    }

    #[test]
    fn test_every_update_is_a_request() {
        let scheduler = Scheduler::new();
        let instance = mount(&scheduler);

        instance.with(|t: &mut Ticker| t.tick()).unwrap();
        instance.with(|t: &mut Ticker| t.tick()).unwrap();

        assert_eq!(scheduler.pending(), 2);
        assert_eq!(scheduler.requested(), 2);
    }

    #[test]
    fn test_flush_renders_pending() {
        let scheduler = Scheduler::new();
        let instance = mount(&scheduler);
        instance.with(|t: &mut Ticker| t.tick()).unwrap();

        assert_eq!(scheduler.flush().unwrap(), 1);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(instance.with(|t: &mut Ticker| t.renders).unwrap(), 1);
    }

    #[test]
    fn test_flush_discards_abandoned() {
        let scheduler = Scheduler::new();
        let instance = mount(&scheduler);
        instance.with(|t: &mut Ticker| t.tick()).unwrap();
        drop(instance);

        assert_eq!(scheduler.flush().unwrap(), 0);
        assert_eq!(scheduler.requested(), 1);
    }

    #[test]
    fn test_failed_flush_keeps_remaining_requests() {
        let scheduler = Scheduler::new();
        let first = mount(&scheduler);
        let second = mount(&scheduler);
        first.with(|t: &mut Ticker| t.tick()).unwrap();
        second.with(|t: &mut Ticker| t.tick()).unwrap();

        let nested = first.with(|_: &mut Ticker| scheduler.flush()).unwrap();
        assert_eq!(nested, Err(Error::Busy(first.id().unwrap())));
        assert_eq!(scheduler.pending(), 2);

        assert_eq!(scheduler.flush().unwrap(), 2);
        assert_eq!(first.with(|t: &mut Ticker| t.renders).unwrap(), 1);
        assert_eq!(second.with(|t: &mut Ticker| t.renders).unwrap(), 1);
        assert_eq!(scheduler.requested(), 2);
    }

    #[test]
    fn test_core_knows_its_instance() {
        let scheduler = Scheduler::new();
        let instance = mount(&scheduler);
        let owner = instance.with(|t: &mut Ticker| t.core.instance()).unwrap();
        assert_eq!(owner, Some(instance));
    }
}
