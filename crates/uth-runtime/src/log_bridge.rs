//! Routes log lines from Lua into host diagnostics.
//!
//! Every line is emitted under the fixed target [`LUA_LOG_TARGET`], so script
//! output can be filtered separately from the runtime's own diagnostics
//! (e.g. `UTH_LOG=uth::lua=trace`).

use std::fmt;

use mlua::Lua;

/// Tracing target for everything scripts log through `uth.ue.UE_LOG`.
pub const LUA_LOG_TARGET: &str = "uth::lua";

/// Severity levels scripts can log at, most severe first.
///
/// The discriminants are the integer values exposed to Lua as
/// `uth.ue.ELogVerbosity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Verbosity {
    Fatal = 1,
    Error = 2,
    Warning = 3,
    Display = 4,
    Info = 5,
    Verbose = 6,
    TraceVerbose = 7,
}

impl Verbosity {
    pub const ALL: [Verbosity; 7] = [
        Verbosity::Fatal,
        Verbosity::Error,
        Verbosity::Warning,
        Verbosity::Display,
        Verbosity::Info,
        Verbosity::Verbose,
        Verbosity::TraceVerbose,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Verbosity::Fatal => "Fatal",
            Verbosity::Error => "Error",
            Verbosity::Warning => "Warning",
            Verbosity::Display => "Display",
            Verbosity::Info => "Info",
            Verbosity::Verbose => "Verbose",
            Verbosity::TraceVerbose => "TraceVerbose",
        }
    }

    pub fn as_raw(self) -> i64 {
        self as i64
    }
}

impl TryFrom<i64> for Verbosity {
    type Error = i64;

    fn try_from(raw: i64) -> Result<Self, i64> {
        Verbosity::ALL
            .into_iter()
            .find(|verbosity| verbosity.as_raw() == raw)
            .ok_or(raw)
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Write one line at `verbosity`.
pub fn emit(verbosity: Verbosity, message: &str) {
    let level = verbosity.name();
    match verbosity {
        Verbosity::Fatal => {
            tracing::error!(target: LUA_LOG_TARGET, verbosity = level, fatal = true, "{message}")
        }
        Verbosity::Error => tracing::error!(target: LUA_LOG_TARGET, verbosity = level, "{message}"),
        Verbosity::Warning => tracing::warn!(target: LUA_LOG_TARGET, verbosity = level, "{message}"),
        Verbosity::Display => tracing::info!(target: LUA_LOG_TARGET, verbosity = level, "{message}"),
        Verbosity::Info | Verbosity::Verbose => {
            tracing::debug!(target: LUA_LOG_TARGET, verbosity = level, "{message}")
        }
        Verbosity::TraceVerbose => {
            tracing::trace!(target: LUA_LOG_TARGET, verbosity = level, "{message}")
        }
    }
}

/// Lua entry point behind `uth.ue.UE_LOG(verbosity, message)`.
///
/// An unknown verbosity is a bug in the calling script and panics; mlua
/// carries the panic back out to the Rust caller that entered Lua.
pub(crate) fn lua_emit(_: &Lua, (raw, message): (i64, String)) -> mlua::Result<()> {
    match Verbosity::try_from(raw) {
        Ok(verbosity) => emit(verbosity, &message),
        Err(raw) => panic!("(UE_LOG) Unknown verbosity level: {raw}"),
    }
    Ok(())
}
