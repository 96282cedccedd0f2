/// Construction, rename, and teardown of individual script states.
mod common;

use std::sync::Arc;

use common::{Capture, Fixture};
use tracing::Level;
use uth_host::ModuleManager;
use uth_runtime::log_bridge::LUA_LOG_TARGET;
use uth_runtime::{BuildConfiguration, NameRegistry, RuntimeContext, ScriptError, ScriptState, UthConfig};

fn lua_state_name(state: &ScriptState) -> String {
    state.eval("=statename", "return uth.statename").unwrap()
}

#[test]
fn construction_claims_default_name_and_runs_bootstrap() {
    let fixture = Fixture::new();
    let context = fixture.context();

    let state = ScriptState::new(&context);

    assert!(state.is_valid());
    assert_eq!(state.name(), "default");
    assert!(fixture.names.is_reserved("default"));
    assert_eq!(lua_state_name(&state), "default");

    let has_utility: bool = state.eval("=test", "return type(uth.utility.redirect_output) == 'function'").unwrap();
    assert!(has_utility);
    assert!(fixture.log_dir().join("lua_default.log").exists());
}

#[test]
fn second_state_gets_suffixed_name() {
    let fixture = Fixture::new();
    let context = fixture.context();

    let first = ScriptState::new(&context);
    let second = ScriptState::new(&context);

    assert_eq!(first.name(), "default");
    assert_eq!(second.name(), "default_1");
    assert_eq!(fixture.names.len(), 2);
}

#[test]
fn search_paths_are_applied_to_package() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let state = ScriptState::new(&context);

    let (path, cpath): (String, String) = state.eval("=test", "return package.path, package.cpath").unwrap();

    assert_eq!(path, context.paths.module_search_path());
    assert_eq!(cpath, context.paths.native_search_path());
    assert!(!path.ends_with(';'));
}

#[test]
fn capability_table_reflects_build_and_paths() {
    let fixture = Fixture::new();
    let context = fixture.context_with(None, BuildConfiguration::Shipping);
    let state = ScriptState::new(&context);

    let (shipping, log_dir): (bool, String) = state.eval("=test", "return uth.ue.BuildShippingOrTest, uth.ue.FPaths.GameLogDir").unwrap();

    assert!(shipping);
    assert_eq!(log_dir, fixture.log_dir().to_string_lossy());
    assert!(state.capabilities().build_shipping_or_test);
}

#[test]
fn module_not_ready_leaves_state_inert() {
    let names = Arc::new(NameRegistry::new());
    let context = RuntimeContext::with_registry(
        &UthConfig::default(),
        Arc::new(ModuleManager::new()),
        Arc::clone(&names),
    );

    let mut state = ScriptState::new(&context);

    assert!(!state.is_valid());
    assert_eq!(state.name(), "");
    assert!(names.is_empty());

    state.destroy();
    state.destroy();
    assert!(!state.is_valid());
}

#[test]
fn failing_bootstrap_is_logged_once_and_state_stays_valid() {
    let fixture = Fixture::new();
    let context = fixture.context_with_bootstrap("error('boom')");
    let capture = Capture::default();

    let state = capture.run(|| ScriptState::new(&context));

    assert!(state.is_valid());
    let errors = capture.at(Level::ERROR);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].message.contains("boom"));
    assert!(errors[0].message.contains("bootstrap"));
}

#[test]
fn bootstrap_syntax_error_is_contained() {
    let fixture = Fixture::new();
    let context = fixture.context_with_bootstrap("this is not lua");
    let capture = Capture::default();

    let state = capture.run(|| ScriptState::new(&context));

    assert!(state.is_valid());
    assert_eq!(capture.at(Level::ERROR).len(), 1);
}

#[test]
fn missing_bootstrap_is_contained() {
    let fixture = Fixture::new();
    let missing = fixture.dir.path().join("nowhere");
    let context = fixture.context_with(Some(missing), BuildConfiguration::Development);
    let capture = Capture::default();

    let state = capture.run(|| ScriptState::new(&context));

    assert!(state.is_valid());
    let errors = capture.at(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Cannot read script"));
}

#[test]
fn destroy_releases_name_and_is_idempotent() {
    let fixture = Fixture::new();
    let context = fixture.context();

    let mut state = ScriptState::new(&context);
    state.destroy();

    assert!(!state.is_valid());
    assert!(!fixture.names.is_reserved("default"));

    state.destroy();
    assert!(!state.is_valid());

    let replacement = ScriptState::new(&context);
    assert_eq!(replacement.name(), "default");

    // Dropping the destroyed state must not release the reused name.
    drop(state);
    assert!(fixture.names.is_reserved("default"));
}

#[test]
fn destroy_unroots_and_marks_pending_kill() {
    use uth_host::HostObject;

    let fixture = Fixture::new();
    let context = fixture.context();
    let mut state = ScriptState::new(&context);
    state.header_mut().add_to_root();

    state.destroy();

    assert!(!state.header().is_rooted());
    assert!(state.header().is_pending_kill());
}

#[test]
fn rename_to_current_name_is_a_noop() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let mut state = ScriptState::new(&context);

    assert!(state.set_name("default"));
    assert_eq!(state.name(), "default");
    assert_eq!(fixture.names.len(), 1);
}

#[test]
fn rename_to_taken_name_fails_without_mutation() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let _first = ScriptState::new(&context);
    let mut second = ScriptState::new(&context);

    assert!(!second.set_name("default"));

    assert_eq!(second.name(), "default_1");
    assert_eq!(lua_state_name(&second), "default_1");
    assert!(fixture.names.is_reserved("default"));
    assert!(fixture.names.is_reserved("default_1"));
    assert_eq!(fixture.names.len(), 2);
}

#[test]
fn rename_updates_registry_table_and_output() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let mut state = ScriptState::new(&context);

    assert!(state.set_name("trainer"));

    assert_eq!(state.name(), "trainer");
    assert!(fixture.names.is_reserved("trainer"));
    assert!(!fixture.names.is_reserved("default"));
    assert_eq!(lua_state_name(&state), "trainer");
    assert_eq!(state.capabilities().state_name, "trainer");

    state.exec("=test", "print('after rename')").unwrap();
    let log = std::fs::read_to_string(fixture.log_dir().join("lua_trainer.log")).unwrap();
    assert!(log.contains("after rename"));
}

#[test]
fn rename_after_failed_bootstrap_logs_missing_hook() {
    let fixture = Fixture::new();
    let context = fixture.context_with_bootstrap("error('boom')");
    let mut state = ScriptState::new(&context);
    let capture = Capture::default();

    let renamed = capture.run(|| state.set_name("partial"));

    assert!(renamed);
    assert_eq!(lua_state_name(&state), "partial");
    let errors = capture.at(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("redirect"));
}

#[test]
#[should_panic(expected = "invalid script state")]
fn rename_after_destroy_panics() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let mut state = ScriptState::new(&context);
    state.destroy();
    state.set_name("late");
}

#[test]
#[should_panic(expected = "invalid script state")]
fn exec_after_destroy_panics() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let mut state = ScriptState::new(&context);
    state.destroy();
    let _ = state.exec("=late", "return 1");
}

#[test]
fn script_logging_goes_through_the_lua_target() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let state = ScriptState::new(&context);
    let capture = Capture::default();

    capture.run(|| {
        state
            .exec(
                "=log",
                "uth.ue.UE_LOG(uth.ue.ELogVerbosity.Warning, 'careful')\n\
                 uth.ue.UE_LOG(uth.ue.ELogVerbosity.Fatal, 'very bad')",
            )
            .unwrap()
    });

    let events: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|event| event.target == LUA_LOG_TARGET)
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].level, Level::WARN);
    assert_eq!(events[0].message, "careful");
    assert_eq!(events[1].level, Level::ERROR);
    assert_eq!(events[1].message, "very bad");
}

#[test]
#[should_panic(expected = "Unknown verbosity level: 99")]
fn unknown_verbosity_from_lua_panics() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let state = ScriptState::new(&context);
    let _ = state.exec("=bad", "uth.ue.UE_LOG(99, 'lost')");
}

#[test]
fn run_file_reports_errors() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let state = ScriptState::new(&context);

    let missing = state.run_file(&fixture.dir.path().join("missing.lua"));
    assert!(matches!(missing, Err(ScriptError::ReadScript { .. })));

    let broken = fixture.dir.path().join("broken.lua");
    common::write(&broken, "error('broken script')");
    let err = state.run_file(&broken).unwrap_err();
    assert!(matches!(err, ScriptError::Lua(_)));
    assert!(err.to_string().contains("broken script"));
}

#[test]
fn project_modules_resolve_through_require() {
    let fixture = Fixture::new();
    common::write(
        &fixture.dir.path().join("Content/Lua/greeter/init.lua"),
        "return { greet = function(who) return 'hi ' .. who end }",
    );
    let context = fixture.context();
    let state = ScriptState::new(&context);

    let greeting: String = state.eval("=test", "return require('greeter').greet(uth.statename)").unwrap();
    assert_eq!(greeting, "hi default");
}

#[test]
#[should_panic(expected = "Unknown verbosity level: 99")]
fn unknown_verbosity_cannot_be_swallowed_by_pcall() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let state = ScriptState::new(&context);
    let _ = state.exec("=pcall", "local ok = pcall(uth.ue.UE_LOG, 99, 'lost')");
}

#[test]
#[should_panic(expected = "invalid script state")]
fn eval_after_destroy_panics() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let mut state = ScriptState::new(&context);
    assert_eq!(state.eval::<String>("=before", "return uth.statename").unwrap(), "default");

    state.destroy();
    let _ = state.eval::<String>("=after", "return uth.statename");
}

#[test]
#[should_panic(expected = "invalid script state")]
fn run_file_after_destroy_panics() {
    let fixture = Fixture::new();
    let script = fixture.dir.path().join("late.lua");
    common::write(&script, "return 1");
    let context = fixture.context();
    let mut state = ScriptState::new(&context);
    state.destroy();
    let _ = state.run_file(&script);
}

#[test]
#[should_panic(expected = "invalid script state")]
fn capabilities_after_destroy_panic() {
    let fixture = Fixture::new();
    let context = fixture.context();
    let mut state = ScriptState::new(&context);
    state.destroy();
    let _ = state.capabilities();
}

