use std::fmt;
use std::path::Path;
use std::sync::Arc;

use mlua::{FromLuaMulti, Lua, LuaOptions, StdLib, Table};
use uth_host::{HostObject, ObjectHeader};

use crate::capabilities::{self, Capabilities};
use crate::context::RuntimeContext;
use crate::error::ScriptError;
use crate::names::{NameLease, NameRegistry};
use crate::paths::ScriptPaths;

/// Base name for freshly constructed states.
pub const DEFAULT_STATE_NAME: &str = "default";

/// The interpreter and the capability snapshot it was built with.
struct Interpreter {
    lua: Lua,
    capabilities: Capabilities,
}

/// One embedded Lua interpreter plus its identity and lifecycle.
///
/// A state is valid while it owns an interpreter and its host object has not
/// been marked pending-kill. [`destroy`](Self::destroy) ends validity for
/// good: the name is released and the interpreter closed immediately, while
/// the object itself waits for the host's next garbage-collection sweep.
///
/// Every operation that touches the interpreter panics on an invalid state.
/// Calling into a destroyed state is a bug in the caller.
pub struct ScriptState {
    header: ObjectHeader,
    name: String,
    lease: Option<NameLease>,
    names: Arc<NameRegistry>,
    interpreter: Option<Interpreter>,
}

impl ScriptState {
    /// Create a state named `default` (or the first free `default_N`), open
    /// the Lua standard library, configure module search paths, install the
    /// `uth` capability table and run the bootstrap script.
    ///
    /// If the runtime module has not started yet, the result is a permanently
    /// invalid state and nothing else happens. A failing bootstrap script is
    /// logged at error level and the state stays valid.
    pub fn new(context: &RuntimeContext) -> Self {
        let mut state = Self {
            header: ObjectHeader::default(),
            name: String::new(),
            lease: None,
            names: Arc::clone(&context.names),
            interpreter: None,
        };

        // The host may instantiate us before the module is up; stay inert.
        if !context.is_ready() {
            tracing::debug!("Runtime module not loaded, script state left uninitialized");
            return state;
        }

        let lease = context.names.claim_unique(DEFAULT_STATE_NAME);
        state.name = lease.name().to_string();

        let capabilities = Capabilities {
            state_name: state.name.clone(),
            build_shipping_or_test: context.build.is_shipping_or_test(),
            game_log_dir: context.paths.log_dir.to_string_lossy().into_owned(),
        };

        let lua = match open_interpreter(&context.paths, &capabilities) {
            Ok(lua) => lua,
            Err(e) => {
                tracing::error!(state = %state.name, "Failed to create Lua state: {e}");
                return state;
            }
        };

        state.lease = Some(lease);
        state.interpreter = Some(Interpreter { lua, capabilities });
        state.run_bootstrap(&context.paths.bootstrap_script());

        tracing::info!(state = %state.name, "Script state created");
        state
    }

    /// True while the interpreter is alive and the object is not pending kill.
    pub fn is_valid(&self) -> bool {
        self.interpreter.is_some() && !self.header.is_pending_kill()
    }

    /// Current name. Empty for a state built before the module was ready.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the state.
    ///
    /// Returns true if the state now carries `new_name` (including when it
    /// already did), false if another state holds that name. On success the
    /// registry and `uth.statename` are updated and Lua output is re-routed
    /// under the new name.
    pub fn set_name(&mut self, new_name: &str) -> bool {
        self.assert_valid("set_name");

        if new_name == self.name {
            return true;
        }

        let Some(lease) = self.names.try_claim(new_name) else {
            tracing::debug!(state = %self.name, requested = new_name, "State name already taken");
            return false;
        };

        // Replacing the lease releases the old name.
        self.lease = Some(lease);
        let previous = std::mem::replace(&mut self.name, new_name.to_string());

        if let Some(interpreter) = &mut self.interpreter {
            interpreter.capabilities.state_name = new_name.to_string();
            let lua = &interpreter.lua;
            if let Err(e) = capabilities::set_state_name(lua, new_name)
                .and_then(|()| capabilities::redirect_output(lua))
            {
                tracing::error!(
                    state = new_name,
                    previous = %previous,
                    "Failed to redirect Lua output after rename: {e}"
                );
            }
        }

        tracing::info!(state = new_name, previous = %previous, "Script state renamed");
        true
    }

    /// Tear the state down.
    ///
    /// Releases the name, unroots the host object, closes the interpreter
    /// synchronously and marks the object pending kill so the host reclaims
    /// it on its next sweep. Safe to call more than once.
    pub fn destroy(&mut self) {
        self.lease = None;

        if self.header.is_rooted() {
            self.header.remove_from_root();
        }

        if self.interpreter.take().is_some() {
            tracing::info!(state = %self.name, "Script state destroyed");
        }

        self.header.mark_pending_kill();
    }

    /// The capability snapshot as currently exposed to Lua.
    pub fn capabilities(&self) -> &Capabilities {
        &self.interpreter("capabilities").capabilities
    }

    /// Run a chunk of Lua source.
    pub fn exec(&self, chunk_name: &str, source: &str) -> Result<(), ScriptError> {
        self.interpreter("exec")
            .lua
            .load(source)
            .set_name(chunk_name)
            .exec()?;
        Ok(())
    }

    /// Run a chunk of Lua source and convert what it returns.
    ///
    /// The interpreter itself is never handed out, so nothing outside the
    /// state can keep it alive past [`destroy`](Self::destroy).
    pub fn eval<R: FromLuaMulti>(&self, chunk_name: &str, source: &str) -> Result<R, ScriptError> {
        Ok(self
            .interpreter("eval")
            .lua
            .load(source)
            .set_name(chunk_name)
            .eval::<R>()?)
    }

    /// Run a Lua file.
    pub fn run_file(&self, path: &Path) -> Result<(), ScriptError> {
        let lua = &self.interpreter("run_file").lua;
        let source = std::fs::read_to_string(path).map_err(|source| ScriptError::ReadScript {
            path: path.to_path_buf(),
            source,
        })?;
        lua.load(source)
            .set_name(format!("@{}", path.display()))
            .exec()?;
        Ok(())
    }

    fn run_bootstrap(&self, script: &Path) {
        match self.run_file(script) {
            Ok(()) => tracing::debug!(state = %self.name, script = %script.display(), "Bootstrap finished"),
            Err(e) => tracing::error!(
                state = %self.name,
                script = %script.display(),
                "Failed to run bootstrap script: {e}"
            ),
        }
    }

    fn interpreter(&self, operation: &str) -> &Interpreter {
        match &self.interpreter {
            Some(interpreter) if !self.header.is_pending_kill() => interpreter,
            _ => panic!(
                "{operation} called on invalid script state '{}'",
                self.name
            ),
        }
    }

    fn assert_valid(&self, operation: &str) {
        self.interpreter(operation);
    }
}

impl HostObject for ScriptState {
    fn header(&self) -> &ObjectHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut ObjectHeader {
        &mut self.header
    }
}

impl fmt::Debug for ScriptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptState")
            .field("name", &self.name)
            .field("valid", &self.is_valid())
            .field("rooted", &self.header.is_rooted())
            .finish()
    }
}

fn open_interpreter(paths: &ScriptPaths, capabilities: &Capabilities) -> Result<Lua, ScriptError> {
    // SAFETY: the full library set includes `debug` and C module loading
    // through `package.cpath`; native extensions need both. Scripts on the
    // search path are host content, not untrusted input.
    // Rust panics must not be catchable by `pcall`: a bad UE_LOG verbosity
    // has to reach the host.
    let options = LuaOptions::new().catch_rust_panics(false);
    let lua = unsafe { Lua::unsafe_new_with(StdLib::ALL, options) };

    let package = lua.globals().get::<Table>("package")?;
    package.set("path", paths.module_search_path())?;
    package.set("cpath", paths.native_search_path())?;

    capabilities.install(&lua)?;
    Ok(lua)
}
