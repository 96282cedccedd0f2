//! Embedded Lua script states for uth.
//!
//! A [`ScriptState`] owns one Lua interpreter, a unique name from the
//! [`NameRegistry`], and a `uth` capability table through which scripts reach
//! the host (logging, build flags, paths). States live inside the host object
//! system via [`ScriptHost`], which hands out handles and reclaims destroyed
//! states on its garbage-collection sweep.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use uth_host::ModuleManager;
//! use uth_runtime::{RuntimeContext, ScriptHost, UthConfig};
//!
//! let config = UthConfig::default();
//! let context = RuntimeContext::new(&config, Arc::new(ModuleManager::new()));
//! context.start_module();
//!
//! let mut host = ScriptHost::new(context);
//! let handle = host.create_state();
//! assert!(host.rename(handle, "trainer"));
//!
//! host.state(handle)
//!     .unwrap()
//!     .exec("=inline", r#"print("hello from " .. uth.statename)"#)
//!     .unwrap();
//!
//! host.destroy_state(handle);
//! host.collect_garbage();
//! ```

pub mod capabilities;
pub mod config;
pub mod context;
pub mod error;
pub mod host;
pub mod log_bridge;
pub mod names;
pub mod paths;
pub mod state;

pub use capabilities::Capabilities;
pub use config::{BuildConfiguration, UthConfig};
pub use context::{MODULE_NAME, RuntimeContext};
pub use error::ScriptError;
pub use host::ScriptHost;
pub use log_bridge::Verbosity;
pub use names::{NameLease, NameRegistry};
pub use paths::ScriptPaths;
pub use state::ScriptState;
