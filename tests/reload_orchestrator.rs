use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_utils::sync::WaitGroup;
use tempfile::TempDir;

use autobuild::config::{BuildCommand, ReloadConfig};
use autobuild::engine::{Builder, BuilderOptions};
use autobuild::errors::BuilderError;
use autobuild::exec::ToolchainRunner;
use autobuild::supervisor::Supervisor;
use autobuild::watch::{event_channel, ChangeEvent, EventSender, Operation};
use autobuild_test_utils::fake_process::{FakeProcess, ProcessCounters};
use autobuild_test_utils::fake_runner::{Call, FakeRunner};
use autobuild_test_utils::log_capture::capture_logs;
use autobuild_test_utils::{init_tracing, wait_until, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn fast_config() -> ReloadConfig {
    ReloadConfig {
        source: PathBuf::from("./app"),
        destination: PathBuf::from("bin/app"),
        reload_interval: Duration::from_millis(5),
        ..ReloadConfig::default()
    }
}

struct Harness {
    builder: Builder,
    events: EventSender,
    runner: FakeRunner,
    watcher: ProcessCounters,
}

fn harness(runner: FakeRunner) -> Harness {
    harness_with(runner, FakeProcess::new("watcher"))
}

fn harness_with(runner: FakeRunner, process: FakeProcess) -> Harness {
    let watcher = process.counters();
    let mut supervisor = Supervisor::new();
    supervisor.add_process(process);

    let (events, events_rx) = event_channel();
    let builder = Builder::from_parts(
        fast_config(),
        supervisor,
        events_rx,
        Arc::new(runner.clone()),
    )
    .with_signal_handling(false);

    Harness {
        builder,
        events,
        runner,
        watcher,
    }
}

fn changed(file: &str) -> ChangeEvent {
    ChangeEvent::new(Operation::Changed, file)
}

fn build_call() -> Call {
    Call::Build {
        source: PathBuf::from("./app"),
        destination: PathBuf::from("bin/app"),
    }
}

fn launch_call() -> Call {
    Call::Launch {
        destination: PathBuf::from("bin/app"),
    }
}

#[tokio::test]
async fn changed_event_builds_then_launches() -> TestResult {
    init_tracing();
    let h = harness(FakeRunner::new());

    h.builder.start(None)?;
    assert!(h.builder.started());
    assert_eq!(h.watcher.starts(), 1);

    h.events.send(changed("main.go"))?;
    wait_until(|| h.runner.launches() == 1).await;

    assert_eq!(h.runner.calls(), vec![build_call(), launch_call()]);

    h.builder.stop(None)?;
    Ok(())
}

#[tokio::test]
async fn failed_build_still_launches_binary() -> TestResult {
    init_tracing();
    let h = harness(FakeRunner::new().failing_build());

    h.builder.start(None)?;
    h.events.send(changed("main.go"))?;
    wait_until(|| h.runner.launches() == 1).await;

    assert_eq!(h.runner.calls(), vec![build_call(), launch_call()]);

    h.builder.stop(None)?;
    Ok(())
}

#[tokio::test]
async fn other_operations_are_ignored() -> TestResult {
    init_tracing();
    let h = harness(FakeRunner::new());

    h.builder.start(None)?;
    for op in [Operation::Created, Operation::Removed, Operation::Renamed, Operation::Other] {
        h.events.send(ChangeEvent::new(op, "main.go"))?;
    }
    // A trailing change proves the ignored events were consumed in order.
    h.events.send(changed("main.go"))?;
    wait_until(|| h.runner.launches() == 1).await;

    assert_eq!(h.runner.calls(), vec![build_call(), launch_call()]);

    h.builder.stop(None)?;
    Ok(())
}

#[tokio::test]
async fn second_change_waits_for_running_binary() -> TestResult {
    init_tracing();
    let h = harness(FakeRunner::new().gated_launch());

    h.builder.start(None)?;
    h.events.send(changed("a.go"))?;
    h.events.send(changed("b.go"))?;

    wait_until(|| h.runner.launches() == 1).await;
    // Give the loop ample time to (wrongly) pick up the second event.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.runner.builds(), 1);

    h.runner.release_launch();
    wait_until(|| h.runner.launches() == 2).await;
    h.runner.release_launch();

    assert_eq!(
        h.runner.calls(),
        vec![build_call(), launch_call(), build_call(), launch_call()]
    );
    assert_eq!(h.runner.max_in_flight(), 1);

    h.builder.stop(None)?;
    Ok(())
}

#[tokio::test]
async fn stop_is_idempotent() -> TestResult {
    init_tracing();
    let h = harness(FakeRunner::new());

    h.builder.start(None)?;
    h.builder.stop(None)?;
    h.builder.stop(None)?;
    h.builder.stop(None)?;

    assert!(!h.builder.started());
    assert_eq!(h.watcher.stops(), 1);

    with_timeout(h.builder.wait()).await;
    Ok(())
}

#[tokio::test]
async fn stop_before_start_does_nothing() -> TestResult {
    let h = harness(FakeRunner::new());
    h.builder.stop(None)?;
    assert_eq!(h.watcher.stops(), 0);
    assert!(!h.builder.started());
    Ok(())
}

#[tokio::test]
async fn quit_request_ends_the_loop() -> TestResult {
    init_tracing();
    let (logs, _guard) = capture_logs();
    let h = harness(FakeRunner::new());

    h.builder.start(None)?;
    h.builder.stop(None)?;
    with_timeout(h.builder.wait()).await;

    assert!(logs.contains("received shutdown signal") || logs.contains("change event stream closed"));
    assert!(logs.contains("reload loop finished"));
    Ok(())
}

#[tokio::test]
async fn closed_event_stream_ends_the_loop() -> TestResult {
    init_tracing();
    let h = harness(FakeRunner::new());

    h.builder.start(None)?;
    drop(h.events);
    with_timeout(h.builder.wait()).await;

    assert!(h.runner.calls().is_empty());
    h.builder.stop(None)?;
    Ok(())
}

#[tokio::test]
async fn supervisor_failure_prevents_start() -> TestResult {
    init_tracing();
    let h = harness_with(FakeRunner::new(), FakeProcess::new("watcher").failing_start());

    let err = h.builder.start(None).unwrap_err();
    assert!(matches!(err, BuilderError::Supervisor { ref process, .. } if process == "watcher"));
    assert!(!h.builder.started());

    // No loop is running, so events go nowhere.
    h.events.send(changed("main.go"))?;
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(h.runner.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn supervisor_stop_error_is_returned() -> TestResult {
    init_tracing();
    let h = harness_with(FakeRunner::new(), FakeProcess::new("watcher").failing_stop());

    h.builder.start(None)?;
    let err = h.builder.stop(None).unwrap_err();
    assert!(matches!(err, BuilderError::Supervisor { .. }));
    assert!(!h.builder.started());

    // The quit request still went out.
    with_timeout(h.builder.wait()).await;
    Ok(())
}

#[tokio::test]
async fn restart_after_stop_is_rejected() -> TestResult {
    init_tracing();
    let h = harness(FakeRunner::new());

    h.builder.start(None)?;
    h.builder.start(None)?;
    assert_eq!(h.watcher.starts(), 1);

    h.builder.stop(None)?;
    assert!(matches!(
        h.builder.start(None),
        Err(BuilderError::EventStreamConsumed)
    ));
    Ok(())
}

#[tokio::test]
async fn wait_group_is_released_by_start_and_stop() -> TestResult {
    init_tracing();
    let h = harness(FakeRunner::new());

    let wg = WaitGroup::new();
    h.builder.start(Some(wg.clone()))?;
    h.builder.stop(Some(wg.clone()))?;

    // Both clones were dropped inside the calls; only ours remains.
    tokio::task::spawn_blocking(move || wg.wait()).await?;
    Ok(())
}

#[test]
fn new_without_config_file_uses_defaults() -> TestResult {
    let dir = TempDir::new()?;
    let (logs, _guard) = capture_logs();

    let builder = Builder::new(
        BuilderOptions::new()
            .with_config_path(dir.path().join("app.missing.json"))
            .with_signal_handling(false),
    );

    assert!(!builder.started());
    assert_eq!(builder.config().reload_interval, Duration::from_secs(1));
    assert_eq!(builder.config().destination, PathBuf::from("bin/app"));
    assert!(logs.contains("failed to load configuration"));
    Ok(())
}

#[test]
fn new_applies_overrides_on_top_of_file() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.test.json");
    std::fs::write(
        &path,
        r#"{ "builder": { "source": "./svc", "destination": "bin/svc", "reload_time": 5 } }"#,
    )?;

    let builder = Builder::new(
        BuilderOptions::new()
            .with_config_path(&path)
            .with_reload_time(Duration::from_millis(100))
            .with_signal_handling(false),
    );

    assert_eq!(builder.config().source, PathBuf::from("./svc"));
    assert_eq!(builder.config().destination, PathBuf::from("bin/svc"));
    assert_eq!(builder.config().reload_interval, Duration::from_millis(100));
    Ok(())
}

#[test]
fn new_with_overflowing_reload_time_falls_back_to_defaults() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("app.huge.json");
    std::fs::write(
        &path,
        r#"{ "builder": { "source": "./svc", "reload_time": "18446744073709551615h" } }"#,
    )?;
    let (logs, _guard) = capture_logs();

    let builder = Builder::new(
        BuilderOptions::new()
            .with_config_path(&path)
            .with_signal_handling(false),
    );

    assert_eq!(builder.config().reload_interval, Duration::from_secs(1));
    assert_eq!(builder.config().source, PathBuf::from("."));
    assert!(logs.contains("failed to load configuration"));
    assert!(logs.contains("duration too large"));
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn user_signal_ends_the_loop() -> TestResult {
    init_tracing();
    let (logs, _guard) = capture_logs();

    let mut supervisor = Supervisor::new();
    supervisor.add_process(FakeProcess::new("watcher"));
    let (_events, events_rx) = event_channel();
    let config = ReloadConfig {
        reload_interval: Duration::from_secs(60),
        ..fast_config()
    };
    let runner = FakeRunner::new();
    let builder = Builder::from_parts(config, supervisor, events_rx, Arc::new(runner.clone()));

    // Handlers are installed here, before the signal is raised.
    builder.start(None)?;

    let status = std::process::Command::new("kill")
        .args(["-USR1", &std::process::id().to_string()])
        .status()?;
    assert!(status.success());

    with_timeout(builder.wait()).await;

    assert!(logs.contains("received term signal"));
    assert!(logs.contains("SIGUSR1"));
    assert!(runner.calls().is_empty());

    builder.stop(None)?;
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn failed_run_is_logged_once() -> TestResult {
    init_tracing();
    let dir = TempDir::new()?;
    let (logs, _guard) = capture_logs();

    let config = ReloadConfig {
        destination: dir.path().join("never-built"),
        reload_interval: Duration::from_millis(5),
        ..ReloadConfig::default()
    };
    let runner = ToolchainRunner::new(BuildCommand {
        program: "true".to_string(),
        args: vec![],
    });
    let (events, events_rx) = event_channel();
    let builder = Builder::from_parts(config, Supervisor::new(), events_rx, Arc::new(runner))
        .with_signal_handling(false);

    builder.start(None)?;
    events.send(changed("main.go"))?;
    drop(events);
    with_timeout(builder.wait()).await;

    assert!(logs.contains("build completed"));
    assert_eq!(logs.contents().matches("error executing restart").count(), 1);

    builder.stop(None)?;
    Ok(())
}
