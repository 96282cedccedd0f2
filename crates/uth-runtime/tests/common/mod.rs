#![allow(dead_code)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};
use uth_host::ModuleManager;
use uth_runtime::config::{BuildConfig, PathsConfig};
use uth_runtime::{BuildConfiguration, NameRegistry, RuntimeContext, UthConfig};

/// One recorded tracing event.
#[derive(Debug, Clone)]
pub struct Captured {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Tracing layer that records every event, for asserting on diagnostics.
#[derive(Clone, Default)]
pub struct Capture {
    events: Arc<Mutex<Vec<Captured>>>,
}

impl Capture {
    /// Run `f` with this capture installed as the thread's subscriber.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = Registry::default().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn events(&self) -> Vec<Captured> {
        self.events.lock().unwrap().clone()
    }

    pub fn at(&self, level: Level) -> Vec<Captured> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .collect()
    }
}

struct MessageVisitor(String);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: Subscriber> Layer<S> for Capture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(Captured {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message: visitor.0,
        });
    }
}

/// Scratch project tree plus a context with its own name registry.
pub struct Fixture {
    pub dir: TempDir,
    pub names: Arc<NameRegistry>,
    pub modules: Arc<ModuleManager>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            names: Arc::new(NameRegistry::new()),
            modules: Arc::new(ModuleManager::new()),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.dir.path().join("logs")
    }

    /// Context using the bundled uth scripts.
    pub fn context(&self) -> RuntimeContext {
        self.context_with(None, BuildConfiguration::Development)
    }

    /// Context whose bundled-script root holds `bootstrap` as `uth/init.lua`.
    pub fn context_with_bootstrap(&self, bootstrap: &str) -> RuntimeContext {
        let root = self.dir.path().join("plugin-lua");
        write(&root.join("uth").join("init.lua"), bootstrap);
        self.context_with(Some(root), BuildConfiguration::Development)
    }

    pub fn context_with(
        &self,
        bundled_scripts: Option<PathBuf>,
        configuration: BuildConfiguration,
    ) -> RuntimeContext {
        std::fs::create_dir_all(self.log_dir()).unwrap();
        let config = UthConfig {
            paths: PathsConfig {
                project_dir: Some(self.dir.path().to_path_buf()),
                bundled_scripts,
                log_dir: Some(self.log_dir()),
                ..Default::default()
            },
            build: BuildConfig { configuration },
        };
        let context =
            RuntimeContext::with_registry(&config, Arc::clone(&self.modules), Arc::clone(&self.names));
        context.start_module();
        context
    }
}

pub fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}
