use uth_host::{Handle, HostObject, ObjectArena};

use crate::context::RuntimeContext;
use crate::state::ScriptState;

/// Binds [`ScriptState`] into the host object system.
///
/// `ScriptHost` owns the shared [`RuntimeContext`] and the arena holding
/// every state. It is the single entry point for creating states, finding
/// them by name, and driving deferred reclamation.
///
/// # Threading
///
/// Lua interpreters are not `Send`, so a `ScriptHost` lives on the thread
/// that runs the host's update loop. Only the name registry inside the
/// context is shared across threads.
pub struct ScriptHost {
    context: RuntimeContext,
    states: ObjectArena<ScriptState>,
}

impl ScriptHost {
    pub fn new(context: RuntimeContext) -> Self {
        Self {
            context,
            states: ObjectArena::new(),
        }
    }

    pub fn context(&self) -> &RuntimeContext {
        &self.context
    }

    /// Construct a new state and hand it to the arena.
    ///
    /// Always returns a handle; if the runtime module is not ready the
    /// state behind it is invalid.
    pub fn create_state(&mut self) -> Handle<ScriptState> {
        let state = ScriptState::new(&self.context);
        self.states.create(state)
    }

    /// Resolve a handle. Destroyed states still resolve until collected.
    pub fn state(&self, handle: Handle<ScriptState>) -> Option<&ScriptState> {
        self.states.get(handle)
    }

    pub fn state_mut(&mut self, handle: Handle<ScriptState>) -> Option<&mut ScriptState> {
        self.states.get_mut(handle)
    }

    /// True if the handle points at a state that is usable right now.
    pub fn is_valid(&self, handle: Handle<ScriptState>) -> bool {
        self.state(handle).is_some_and(ScriptState::is_valid)
    }

    /// True if the state is destroyed but its memory is not yet reclaimed.
    pub fn is_pending_kill(&self, handle: Handle<ScriptState>) -> bool {
        self.states.is_pending_kill(handle)
    }

    /// Find a valid state by name.
    pub fn find(&self, name: &str) -> Option<Handle<ScriptState>> {
        self.states
            .iter()
            .find(|(_, state)| state.is_valid() && state.name() == name)
            .map(|(handle, _)| handle)
    }

    /// Handles of every valid state.
    pub fn live_states(&self) -> Vec<Handle<ScriptState>> {
        self.states
            .iter()
            .filter(|(_, state)| state.is_valid())
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Exempt a state from collection.
    ///
    /// Returns false if the handle is stale or the state is already dead.
    pub fn add_to_root(&mut self, handle: Handle<ScriptState>) -> bool {
        match self.states.get_mut(handle) {
            Some(state) if state.is_valid() => {
                state.header_mut().add_to_root();
                true
            }
            _ => false,
        }
    }

    /// Rename a state. See [`ScriptState::set_name`].
    ///
    /// Panics if the handle does not resolve to a valid state.
    pub fn rename(&mut self, handle: Handle<ScriptState>, new_name: &str) -> bool {
        self.valid_state_mut(handle, "rename").set_name(new_name)
    }

    /// Destroy a state. Stale handles are ignored, as is a second call.
    pub fn destroy_state(&mut self, handle: Handle<ScriptState>) {
        if let Some(state) = self.states.get_mut(handle) {
            state.destroy();
        }
    }

    /// Reclaim every destroyed state. Returns how many were reclaimed.
    pub fn collect_garbage(&mut self) -> usize {
        self.states.collect_garbage()
    }

    /// States held in memory, including those pending reclamation.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn valid_state_mut(&mut self, handle: Handle<ScriptState>, operation: &str) -> &mut ScriptState {
        match self.states.get_mut(handle) {
            Some(state) if state.is_valid() => state,
            _ => panic!("{operation} called with invalid script state handle {handle:?}"),
        }
    }
}

impl Drop for ScriptHost {
    fn drop(&mut self) {
        for handle in self.live_states() {
            self.destroy_state(handle);
        }
        let reclaimed = self.collect_garbage();
        tracing::debug!(reclaimed, "Script host shut down");
    }
}
