use std::sync::{Arc, Mutex};

use autobuild::errors::BuilderError;
use autobuild::supervisor::Supervisor;
use autobuild_test_utils::fake_process::FakeProcess;

fn journaled(names: &[&str], journal: &Arc<Mutex<Vec<String>>>) -> Supervisor {
    let mut sup = Supervisor::new();
    for name in names {
        sup.add_process(FakeProcess::new(name).journal(Arc::clone(journal)));
    }
    sup
}

#[test]
fn starts_in_order_and_stops_in_reverse() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut sup = journaled(&["watcher", "proxy"], &journal);

    sup.start().unwrap();
    assert!(sup.is_started());
    sup.stop().unwrap();
    assert!(!sup.is_started());

    assert_eq!(
        *journal.lock().unwrap(),
        vec!["start:watcher", "start:proxy", "stop:proxy", "stop:watcher"]
    );
}

#[test]
fn failed_start_rolls_back_started_processes() {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut sup = Supervisor::new();
    sup.add_process(FakeProcess::new("watcher").journal(Arc::clone(&journal)));
    sup.add_process(
        FakeProcess::new("broken")
            .failing_start()
            .journal(Arc::clone(&journal)),
    );

    let err = sup.start().unwrap_err();
    match err {
        BuilderError::Supervisor { process, source } => {
            assert_eq!(process, "broken");
            assert!(source.to_string().contains("refused to start"));
        }
        other => panic!("expected Supervisor error, got {other:?}"),
    }
    assert!(!sup.is_started());
    assert_eq!(
        *journal.lock().unwrap(),
        vec!["start:watcher", "start:broken", "stop:watcher"]
    );
}

#[test]
fn start_and_stop_are_idempotent() {
    let process = FakeProcess::new("watcher");
    let counters = process.counters();
    let mut sup = Supervisor::new();
    sup.add_process(process);

    sup.start().unwrap();
    sup.start().unwrap();
    sup.stop().unwrap();
    sup.stop().unwrap();

    assert_eq!(counters.starts(), 1);
    assert_eq!(counters.stops(), 1);
}

#[test]
fn stop_attempts_every_process_and_reports_first_failure() {
    let first = FakeProcess::new("first");
    let first_counters = first.counters();
    let mut sup = Supervisor::new();
    sup.add_process(first);
    sup.add_process(FakeProcess::new("second").failing_stop());

    sup.start().unwrap();
    let err = sup.stop().unwrap_err();

    assert!(matches!(err, BuilderError::Supervisor { ref process, .. } if process == "second"));
    assert_eq!(first_counters.stops(), 1);
    assert_eq!(sup.process_names(), vec!["first", "second"]);
}
