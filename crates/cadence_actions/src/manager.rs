//! Action manager
//!
//! Tracks which actions run on which owners and steps them from a
//! scheduler timer. Registrations are keyed by the identity of the
//! (action, owner) pair and kept in insertion order, so actions added
//! earlier are stepped first.
//!
//! Callbacks running inside a step may add or remove registrations: every
//! tick walks a snapshot of the keys and re-checks each one before use.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use tracing::{debug, trace};

use cadence_core::{CadenceError, Result, Scheduler, TargetRef, Timer};

use crate::action::Action;

// ─────────────────────────────────────────────────────────────────────────────
// Action handle
// ─────────────────────────────────────────────────────────────────────────────

struct HandleInner {
    action: RefCell<Action>,
    tag: RefCell<Option<String>>,
}

/// Shared handle to an action, compared by identity
///
/// The manager steps the action through the handle while the application
/// keeps its own clone to look it up, tag it or remove it later.
#[derive(Clone)]
pub struct ActionHandle {
    inner: Rc<HandleInner>,
}

impl ActionHandle {
    pub fn new(action: Action) -> Self {
        Self {
            inner: Rc::new(HandleInner {
                action: RefCell::new(action),
                tag: RefCell::new(None),
            }),
        }
    }

    /// Builder: set the tag
    pub fn with_tag(self, tag: impl Into<String>) -> Self {
        self.set_tag(tag);
        self
    }

    pub fn tag(&self) -> Option<String> {
        self.inner.tag.borrow().clone()
    }

    pub fn set_tag(&self, tag: impl Into<String>) {
        *self.inner.tag.borrow_mut() = Some(tag.into());
    }

    fn has_tag(&self, tag: &str) -> bool {
        self.inner.tag.borrow().as_deref() == Some(tag)
    }

    /// Borrow the action
    ///
    /// Panics when the action is being stepped, like any `RefCell` borrow.
    pub fn borrow(&self) -> Ref<'_, Action> {
        self.inner.action.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Action> {
        self.inner.action.borrow_mut()
    }

    fn try_borrow_mut(&self) -> Result<RefMut<'_, Action>> {
        self.inner
            .action
            .try_borrow_mut()
            .map_err(|_| CadenceError::ActionBusy)
    }

    /// Address of the action, stable while any handle is alive
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    pub fn ptr_eq(&self, other: &ActionHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn name(&self) -> &'static str {
        self.inner
            .action
            .try_borrow()
            .map(|action| action.name())
            .unwrap_or("Action")
    }
}

impl From<Action> for ActionHandle {
    fn from(action: Action) -> Self {
        Self::new(action)
    }
}

impl PartialEq for ActionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ActionHandle {}

impl fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandle")
            .field("name", &self.name())
            .field("tag", &self.tag())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Identity of an (action, owner) pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct RegistrationKey {
    action: usize,
    owner: usize,
}

struct Registration {
    action: ActionHandle,
    owner: TargetRef,
    paused: bool,
    started: bool,
}

type Registry = IndexMap<RegistrationKey, Registration, FxBuildHasher>;

type KeySnapshot = SmallVec<[RegistrationKey; 16]>;

/// Runs registered actions once per scheduler tick
///
/// A cheap handle: clones share the same registrations, so callbacks can
/// hold one to add or remove actions mid-tick.
#[derive(Clone)]
pub struct ActionManager {
    registry: Rc<RefCell<Registry>>,
    timer: Timer,
    scheduler: Scheduler,
}

impl ActionManager {
    /// Create a manager stepped by `scheduler` on every tick
    pub fn new(scheduler: &Scheduler) -> Self {
        let registry = Rc::new(RefCell::new(Registry::default()));
        let weak: Weak<RefCell<Registry>> = Rc::downgrade(&registry);
        let timer = Timer::new(0.0, move |dt| match weak.upgrade() {
            Some(registry) => tick_registry(&registry, dt),
            None => Ok(()),
        });
        scheduler.schedule(&timer);

        Self {
            registry,
            timer,
            scheduler: scheduler.clone(),
        }
    }

    /// Stop being stepped by the scheduler; registrations are kept
    pub fn detach(&self) {
        self.scheduler.unschedule(&self.timer);
    }

    /// Register `action` to run on `owner`
    ///
    /// A pair that is already registered is left alone. Unless `paused`,
    /// the action starts right away; a paused one starts on its first
    /// unpaused tick.
    pub fn add_action(&self, action: &ActionHandle, owner: &TargetRef, paused: bool) -> Result<()> {
        let key = RegistrationKey {
            action: action.id(),
            owner: owner.id(),
        };
        {
            let mut registry = self.registry.borrow_mut();
            if registry.contains_key(&key) {
                return Ok(());
            }
            registry.insert(
                key,
                Registration {
                    action: action.clone(),
                    owner: owner.clone(),
                    paused,
                    started: !paused,
                },
            );
        }
        debug!(action = action.name(), owner = owner.id(), paused, "action added");

        if !paused {
            let started = action
                .try_borrow_mut()
                .and_then(|mut running| running.start(owner));
            if let Err(err) = started {
                self.registry.borrow_mut().shift_remove(&key);
                release(action);
                debug!(action = action.name(), owner = owner.id(), %err, "action failed to start");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Remove every action registered on `owner`, without stopping them
    pub fn remove_all_actions(&self, owner: &TargetRef) {
        let mut registry = self.registry.borrow_mut();
        let before = registry.len();
        registry.retain(|key, _| key.owner != owner.id());
        debug!(owner = owner.id(), removed = before - registry.len(), "actions removed");
    }

    /// Remove `action` from the owner it was last started on, without
    /// stopping it
    ///
    /// An action that was never started, or is being stepped right now, has
    /// no owner to look up; it is removed from every owner instead.
    pub fn remove_action(&self, action: &ActionHandle) {
        let original_owner = action
            .inner
            .action
            .try_borrow()
            .ok()
            .and_then(|running| running.original_owner().map(TargetRef::id));

        let mut registry = self.registry.borrow_mut();
        let before = registry.len();
        match original_owner {
            Some(owner) => {
                registry.shift_remove(&RegistrationKey {
                    action: action.id(),
                    owner,
                });
            }
            None => registry.retain(|key, _| key.action != action.id()),
        }
        if registry.len() != before {
            debug!(action = action.name(), "action removed");
        }
    }

    /// Remove every action on `owner` carrying `tag`
    pub fn remove_action_by_tag(&self, tag: &str, owner: &TargetRef) {
        let mut registry = self.registry.borrow_mut();
        let before = registry.len();
        registry.retain(|key, entry| !(key.owner == owner.id() && entry.action.has_tag(tag)));
        if registry.len() != before {
            debug!(tag, owner = owner.id(), "tagged actions removed");
        }
    }

    /// The single action on `owner` carrying `tag`
    ///
    /// `None` when no action or more than one action matches.
    pub fn action_by_tag(&self, tag: &str, owner: &TargetRef) -> Option<ActionHandle> {
        let registry = self.registry.borrow();
        let mut matches = registry
            .iter()
            .filter(|(key, entry)| key.owner == owner.id() && entry.action.has_tag(tag))
            .map(|(_, entry)| &entry.action);
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first.clone())
    }

    /// Number of actions registered on `owner`, paused ones included
    pub fn running_action_count(&self, owner: &TargetRef) -> usize {
        self.registry
            .borrow()
            .keys()
            .filter(|key| key.owner == owner.id())
            .count()
    }

    /// Stop stepping the actions on `owner`; their progress is kept
    pub fn pause_all_actions(&self, owner: &TargetRef) {
        self.set_paused(owner, true);
        debug!(owner = owner.id(), "actions paused");
    }

    /// Resume stepping the actions on `owner` from where they were
    pub fn resume_all_actions(&self, owner: &TargetRef) {
        self.set_paused(owner, false);
        debug!(owner = owner.id(), "actions resumed");
    }

    fn set_paused(&self, owner: &TargetRef, paused: bool) {
        for (key, entry) in self.registry.borrow_mut().iter_mut() {
            if key.owner == owner.id() {
                entry.paused = paused;
            }
        }
    }

    pub fn is_registered(&self, action: &ActionHandle, owner: &TargetRef) -> bool {
        self.registry.borrow().contains_key(&RegistrationKey {
            action: action.id(),
            owner: owner.id(),
        })
    }

    pub fn is_paused(&self, action: &ActionHandle, owner: &TargetRef) -> bool {
        self.registry
            .borrow()
            .get(&RegistrationKey {
                action: action.id(),
                owner: owner.id(),
            })
            .is_some_and(|entry| entry.paused)
    }

    /// Total number of registrations
    pub fn len(&self) -> usize {
        self.registry.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.borrow().is_empty()
    }

    /// Step every unpaused action by `dt`
    ///
    /// Normally driven by the scheduler; exposed for driving a manager
    /// without one.
    pub fn tick(&self, dt: f32) -> Result<()> {
        tick_registry(&self.registry, dt)
    }
}

impl fmt::Debug for ActionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionManager")
            .field("registrations", &self.len())
            .finish_non_exhaustive()
    }
}

/// Unbind an action dropped after an error, if nobody else holds it
fn release(action: &ActionHandle) {
    if let Ok(mut action) = action.try_borrow_mut() {
        action.stop();
    }
}

fn tick_registry(registry: &RefCell<Registry>, dt: f32) -> Result<()> {
    let keys: KeySnapshot = registry.borrow().keys().copied().collect();
    trace!(dt, actions = keys.len(), "action manager tick");

    for key in keys {
        let (handle, owner, needs_start) = {
            let mut registry = registry.borrow_mut();
            let Some(entry) = registry.get_mut(&key) else {
                continue;
            };
            if entry.paused {
                continue;
            }
            let needs_start = !entry.started;
            entry.started = true;
            (entry.action.clone(), entry.owner.clone(), needs_start)
        };

        let outcome = {
            let mut action = handle.try_borrow_mut()?;
            let started = if needs_start {
                action.start(&owner)
            } else {
                Ok(())
            };
            match started.and_then(|()| action.step(dt)) {
                Ok(()) => Ok(action.is_done()),
                Err(err) => Err(err),
            }
        };

        // A failing registration would fail every later tick too
        let done = match outcome {
            Ok(done) => done,
            Err(err) => {
                registry.borrow_mut().shift_remove(&key);
                release(&handle);
                debug!(action = handle.name(), owner = owner.id(), %err, "failing action removed");
                return Err(err);
            }
        };

        if done && registry.borrow_mut().shift_remove(&key).is_some() {
            handle.try_borrow_mut()?.stop();
            trace!(action = handle.name(), owner = owner.id(), "action finished");
        }
    }
    Ok(())
}
