use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};
use uth_host::{Handle, ModuleManager};
use uth_runtime::{RuntimeContext, ScriptHost, ScriptState, UthConfig};

#[derive(Parser)]
#[command(name = "uth", about = "uth — host embedded Lua script states")]
struct Cli {
    /// Path to config.toml. Defaults to $UTH_CONFIG, then the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a script state, run Lua files in it, then destroy it
    Run {
        /// Lua files to run, in order
        #[arg(required = true)]
        scripts: Vec<PathBuf>,

        /// Rename the state before running anything
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the resolved module and native search paths
    Paths,
    /// Create a script state and print the capability table it was given
    Inspect {
        #[arg(long)]
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    // Diagnostics go to stderr. Lua `print` output lands in the state's
    // lua_<name>.log, so stdout only carries what `paths` and `inspect` print.
    fmt()
        .with_env_filter(EnvFilter::from_env("UTH_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    let context = RuntimeContext::new(&config, Arc::new(ModuleManager::new()));
    context.start_module();

    match cli.command {
        Command::Run { scripts, name } => {
            let mut host = ScriptHost::new(context);
            let handle = spawn_state(&mut host, name.as_deref())?;
            let state = host.state(handle).context("script state vanished")?;

            for script in &scripts {
                tracing::info!(state = state.name(), script = %script.display(), "Running script");
                state
                    .run_file(script)
                    .map_err(|e| anyhow!("{} failed: {e}", script.display()))?;
            }

            host.destroy_state(handle);
            host.collect_garbage();
        }
        Command::Paths => {
            let paths = &context.paths;
            println!("package.path  = {}", paths.module_search_path());
            println!("package.cpath = {}", paths.native_search_path());
            println!("bootstrap     = {}", paths.bootstrap_script().display());
            println!("log dir       = {}", paths.log_dir.display());
        }
        Command::Inspect { name } => {
            let mut host = ScriptHost::new(context);
            let handle = spawn_state(&mut host, name.as_deref())?;
            let state = host.state(handle).context("script state vanished")?;
            println!("{}", serde_json::to_string_pretty(state.capabilities())?);
        }
    }

    tracing::debug!("uth shutting down");
    Ok(())
}

fn load_config(explicit: Option<PathBuf>) -> Result<UthConfig> {
    let path = explicit.or_else(|| std::env::var_os("UTH_CONFIG").map(PathBuf::from));
    let path = match path {
        Some(path) => path,
        None => {
            let default = UthConfig::default_path();
            if !default.exists() {
                return Ok(UthConfig::default());
            }
            default
        }
    };

    tracing::info!(path = %path.display(), "Loading configuration");
    UthConfig::from_file(&path).map_err(|e| anyhow!("failed to load {}: {e}", path.display()))
}

fn spawn_state(host: &mut ScriptHost, name: Option<&str>) -> Result<Handle<ScriptState>> {
    let handle = host.create_state();
    if !host.is_valid(handle) {
        bail!("script state failed to initialize");
    }
    if let Some(name) = name
        && !host.rename(handle, name)
    {
        bail!("state name '{name}' is already in use");
    }
    Ok(handle)
}
