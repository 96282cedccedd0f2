use mlua::{Lua, Table};
use serde::Serialize;

use crate::log_bridge::{self, Verbosity};

/// Global table every script state exposes to Lua.
pub const NAMESPACE: &str = "uth";

/// Host data handed to a script state at construction.
///
/// Built once in Rust and copied into Lua as:
///
/// ```text
/// uth
///   .statename                         name of this state
///   .ue
///     .UE_LOG(verbosity, message)      write to host diagnostics
///     .ELogVerbosity                   integer constants for UE_LOG
///     .BuildShippingOrTest             true in shipping/test builds
///     .FPaths
///       .GameLogDir                    host log directory
/// ```
///
/// Scripts read the table; nothing they write to it flows back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub state_name: String,
    pub build_shipping_or_test: bool,
    pub game_log_dir: String,
}

impl Capabilities {
    pub fn install(&self, lua: &Lua) -> mlua::Result<()> {
        let verbosity = lua.create_table()?;
        for level in Verbosity::ALL {
            verbosity.set(level.name(), level.as_raw())?;
        }

        let fpaths = lua.create_table()?;
        fpaths.set("GameLogDir", self.game_log_dir.as_str())?;

        let ue = lua.create_table()?;
        ue.set("UE_LOG", lua.create_function(log_bridge::lua_emit)?)?;
        ue.set("ELogVerbosity", verbosity)?;
        ue.set("BuildShippingOrTest", self.build_shipping_or_test)?;
        ue.set("FPaths", fpaths)?;

        let root = lua.create_table()?;
        root.set("statename", self.state_name.as_str())?;
        root.set("ue", ue)?;
        lua.globals().set(NAMESPACE, root)
    }
}

/// Overwrite `uth.statename` after a rename.
pub(crate) fn set_state_name(lua: &Lua, name: &str) -> mlua::Result<()> {
    namespace(lua)?.set("statename", name)
}

/// Call `uth.utility.redirect_output()`, installed by the bootstrap script.
pub(crate) fn redirect_output(lua: &Lua) -> mlua::Result<()> {
    namespace(lua)?
        .get::<Table>("utility")?
        .get::<mlua::Function>("redirect_output")?
        .call::<()>(())
}

fn namespace(lua: &Lua) -> mlua::Result<Table> {
    lua.globals().get::<Table>(NAMESPACE)
}
