//! Instance registry
//!
//! Owns the host and every mounted instance, routes inputs and wakes to
//! the right one and collects notifications.

use std::collections::{BTreeMap, HashMap};

use tabset_dom::NodeId;

use crate::TabsError;
use crate::config::PartialOptions;
use crate::events::Event;
use crate::host::{Host, Wake};
use crate::instance::{Input, Instance, InstanceId};
use crate::markers;
use crate::registry::Target;

pub struct Manager<H: Host> {
    host: H,
    instances: BTreeMap<InstanceId, Instance>,
    by_container: HashMap<NodeId, InstanceId>,
    next_id: u64,
    events: Vec<Event>,
}

impl<H: Host> Manager<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            instances: BTreeMap::new(),
            by_container: HashMap::new(),
            next_id: 0,
            events: Vec::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Mount every container under `root` that is not mounted yet.
    /// Containers with invalid configuration are skipped with a warning.
    pub fn discover(&mut self, root: NodeId) -> Vec<InstanceId> {
        let containers = self.host.query_attribute(root, markers::CONTAINER);
        let mut mounted = Vec::new();
        for container in containers {
            if self.by_container.contains_key(&container) {
                continue;
            }
            match self.mount(container) {
                Ok(id) => mounted.push(id),
                Err(err) => tracing::warn!("Skipping container {}: {}", container, err),
            }
        }
        tracing::info!("Discovered {} tab containers", mounted.len());
        mounted
    }

    /// Mount one container and bring it up
    pub fn mount(&mut self, container: NodeId) -> Result<InstanceId, TabsError> {
        if self.by_container.contains_key(&container) {
            return Err(TabsError::AlreadyMounted(container));
        }
        let id = InstanceId(self.next_id + 1);
        let mut instance = Instance::mount(&mut self.host, id, container)?;
        self.next_id += 1;

        instance.start(&mut self.host);
        self.events.extend(instance.take_events());
        self.by_container.insert(container, id);
        self.instances.insert(id, instance);
        Ok(id)
    }

    pub fn get(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    pub fn instance_for(&self, container: NodeId) -> Option<&Instance> {
        self.by_container.get(&container).and_then(|id| self.instances.get(id))
    }

    /// Live instances in mount order
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    fn with<R>(&mut self, id: InstanceId, f: impl FnOnce(&mut Instance, &mut H) -> R) -> Result<R, TabsError> {
        let instance = self.instances.get_mut(&id).ok_or(TabsError::UnknownInstance(id))?;
        let out = f(instance, &mut self.host);
        self.events.extend(instance.take_events());
        Ok(out)
    }

    // ===== Per-instance operations =====

    pub fn enable(&mut self, id: InstanceId) -> Result<(), TabsError> {
        self.with(id, |i, host| i.enable(host))
    }

    pub fn disable(&mut self, id: InstanceId) -> Result<(), TabsError> {
        self.with(id, |i, host| i.disable(host))
    }

    /// Disable and forget the instance
    pub fn destroy(&mut self, id: InstanceId) -> Result<(), TabsError> {
        self.with(id, |i, host| i.destroy(host))?;
        if let Some(instance) = self.instances.remove(&id) {
            self.by_container.remove(&instance.container());
        }
        Ok(())
    }

    pub fn refresh(&mut self, id: InstanceId) -> Result<(), TabsError> {
        self.with(id, |i, host| i.refresh(host))?
    }

    pub fn show(&mut self, id: InstanceId, target: impl Into<Target>) -> Result<(), TabsError> {
        let target = target.into();
        self.with(id, |i, host| i.show(host, &target))
    }

    pub fn next(&mut self, id: InstanceId) -> Result<(), TabsError> {
        self.with(id, |i, host| i.next(host))
    }

    pub fn prev(&mut self, id: InstanceId) -> Result<(), TabsError> {
        self.with(id, |i, host| i.prev(host))
    }

    pub fn start_autoplay(&mut self, id: InstanceId) -> Result<(), TabsError> {
        self.with(id, |i, host| i.start_autoplay(host))
    }

    pub fn stop_autoplay(&mut self, id: InstanceId) -> Result<(), TabsError> {
        self.with(id, |i, host| i.stop_autoplay(host))
    }

    pub fn set_options(&mut self, id: InstanceId, patch: PartialOptions) -> Result<(), TabsError> {
        self.with(id, |i, host| i.set_options(host, patch))
    }

    pub fn set_accordion(&mut self, id: InstanceId, on: bool) -> Result<(), TabsError> {
        self.with(id, |i, host| i.set_accordion(host, on))
    }

    pub fn sync_accordion_slots(&mut self, id: InstanceId) -> Result<(), TabsError> {
        self.with(id, |i, host| i.sync_accordion_slots(host))
    }

    // ===== Routing =====

    /// Deliver a scheduled callback. Wakes for destroyed instances are dropped.
    pub fn dispatch(&mut self, wake: Wake) {
        if self.with(wake.instance, |i, host| i.on_wake(host, wake.kind)).is_err() {
            tracing::debug!("Dropping wake for released {}", wake.instance);
        }
    }

    /// Route user input on `node` to the innermost instance that takes it.
    /// Returns whether any instance consumed it.
    pub fn input(&mut self, node: NodeId, input: Input) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if let Some(&id) = self.by_container.get(&n) {
                if let Ok(true) = self.with(id, |i, host| i.handle_input(host, node, input)) {
                    return true;
                }
            }
            cur = self.host.parent(n);
        }
        false
    }

    /// Re-evaluate every breakpoint after the viewport changed, then put
    /// accordion panels back into their slots
    pub fn viewport_changed(&mut self) {
        let ids: Vec<InstanceId> = self.instances.keys().copied().collect();
        for id in ids {
            let _ = self.with(id, |i, host| {
                i.evaluate_responsive(host);
                i.sync_accordion_slots(host);
            });
        }
    }

    /// Notifications emitted since the last call
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
