//! Integration tests for the full scheduling pipeline.
//!
//! Tests: Registry → Worker cycle → TaskStore coordination
//!
//! Verifies:
//! - A first cycle bootstraps the coordination record and runs immediately
//! - Persisted state round-trips bit-for-bit between cycles
//! - Replicas sharing a store skip windows another replica has claimed
//! - The circuit breaker permanently stops a persistently failing task
//! - Launched workers actually execute on their own threads

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::Utc;

use rota_core::{Execution, TaskError, TaskExecutor, TaskId};

use crate::registry::TaskRegistry;
use crate::runner::{CycleOutcome, TaskWorker, WorkerConfig};
use crate::store::{InMemoryTaskStore, TaskStore};

/// Executor that records every prior state it is invoked with and counts
/// up a cursor in its persisted state.
struct CountingExecutor {
    seen: Arc<Mutex<Vec<String>>>,
    next_interval: Duration,
}

impl CountingExecutor {
    fn new(seen: Arc<Mutex<Vec<String>>>, next_interval: Duration) -> Self {
        Self {
            seen,
            next_interval,
        }
    }
}

impl TaskExecutor for CountingExecutor {
    fn enabled(&self) -> bool {
        true
    }

    fn execute(&mut self, prior_state: &str) -> Execution {
        self.seen.lock().unwrap().push(prior_state.to_string());

        let cursor = serde_json::from_str::<serde_json::Value>(prior_state)
            .ok()
            .and_then(|v| v.get("cursor").and_then(|c| c.as_i64()))
            .unwrap_or(0);
        Execution::completed(
            self.next_interval,
            serde_json::json!({ "cursor": cursor + 1 }),
        )
    }
}

struct AlwaysFailingExecutor;

impl TaskExecutor for AlwaysFailingExecutor {
    fn enabled(&self) -> bool {
        true
    }

    fn execute(&mut self, _prior_state: &str) -> Execution {
        Execution::failed(
            TaskError::execution("downstream unavailable"),
            serde_json::json!(null),
        )
    }
}

fn test_config() -> WorkerConfig {
    WorkerConfig::default()
}

/// Reopen the task's window by rewinding its claim far into the past, as
/// if the interval had genuinely elapsed.
fn rewind_window(store: &InMemoryTaskStore, id: &TaskId) {
    let mut record = store.fetch_or_init(id).unwrap();
    record.last_execution_at = Some(Utc::now() - chrono::Duration::days(1));
    store.save(&record).unwrap();
}

#[test]
fn first_cycle_bootstraps_the_record_and_runs_immediately() -> anyhow::Result<()> {
    let store = InMemoryTaskStore::arc();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut worker = TaskWorker::new(
        TaskId::new("refresh_downloads"),
        Box::new(CountingExecutor::new(
            Arc::clone(&seen),
            Duration::from_secs(60),
        )),
        Arc::clone(&store),
        &test_config(),
    );

    assert!(store.is_empty());
    assert_eq!(worker.run_cycle(), CycleOutcome::Completed);

    // First invocation saw the empty state of a never-run task.
    assert_eq!(seen.lock().unwrap().as_slice(), [String::new()]);

    let record = store
        .get(&TaskId::new("refresh_downloads"))
        .expect("record was created");
    assert!(record.last_execution_at.is_some());
    assert_eq!(record.state, r#"{"cursor":1}"#);
    Ok(())
}

#[test]
fn persisted_state_round_trips_between_cycles() -> anyhow::Result<()> {
    let store = InMemoryTaskStore::arc();
    let seen = Arc::new(Mutex::new(Vec::new()));
    // A zero next-interval keeps the window open for the follow-up cycle.
    let mut worker = TaskWorker::new(
        TaskId::new("refresh_downloads"),
        Box::new(CountingExecutor::new(Arc::clone(&seen), Duration::ZERO)),
        Arc::clone(&store),
        &test_config(),
    );

    assert_eq!(worker.run_cycle(), CycleOutcome::Completed);
    assert_eq!(worker.run_cycle(), CycleOutcome::Completed);

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen.as_slice(),
        ["".to_string(), r#"{"cursor":1}"#.to_string()]
    );

    let record = store.get(&TaskId::new("refresh_downloads")).unwrap();
    assert_eq!(record.state, r#"{"cursor":2}"#);
    Ok(())
}

#[test]
fn replica_skips_a_window_claimed_by_another() {
    let store = InMemoryTaskStore::arc();
    let id = TaskId::new("refresh_downloads");

    let seen_a = Arc::new(Mutex::new(Vec::new()));
    let seen_b = Arc::new(Mutex::new(Vec::new()));
    let mut replica_a = TaskWorker::new(
        id.clone(),
        Box::new(CountingExecutor::new(
            Arc::clone(&seen_a),
            Duration::from_secs(60),
        )),
        Arc::clone(&store),
        &test_config(),
    );
    let mut replica_b = TaskWorker::new(
        id.clone(),
        Box::new(CountingExecutor::new(
            Arc::clone(&seen_b),
            Duration::from_secs(60),
        )),
        Arc::clone(&store),
        &test_config(),
    );

    assert_eq!(replica_a.run_cycle(), CycleOutcome::Completed);
    assert_eq!(replica_b.run_cycle(), CycleOutcome::Skipped);

    // Replica B never executed and did not disturb A's result.
    assert!(seen_b.lock().unwrap().is_empty());
    assert_eq!(store.get(&id).unwrap().state, r#"{"cursor":1}"#);
}

#[test]
fn circuit_breaker_permanently_stops_a_failing_task() {
    let store = InMemoryTaskStore::arc();
    let id = TaskId::new("refresh_downloads");
    let mut worker = TaskWorker::new(
        id.clone(),
        Box::new(AlwaysFailingExecutor),
        Arc::clone(&store),
        &test_config(),
    );

    // Ten consecutive failures leave the worker limping along...
    for cycle in 1..=10 {
        assert_eq!(worker.run_cycle(), CycleOutcome::Failed, "cycle {cycle}");
        rewind_window(&store, &id);
    }

    // ...the eleventh trips the breaker for good.
    assert_eq!(worker.run_cycle(), CycleOutcome::Tripped);
}

#[test]
fn spawned_worker_executes_on_its_own_thread() {
    // Workers log through the ambient dispatcher; initialize it the way a
    // host process would.
    rota_observability::init_with_default("warn");

    let mut registry = TaskRegistry::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let executor_seen = Arc::clone(&seen);
    registry.register("refresh_downloads", move || {
        CountingExecutor::new(Arc::clone(&executor_seen), Duration::from_millis(5))
    });

    let store = InMemoryTaskStore::arc();
    let config = WorkerConfig {
        initial_interval: Duration::from_millis(5),
        ..WorkerConfig::default()
    };

    registry
        .spawn_all(Arc::clone(&store), &config)
        .expect("spawn_all");

    thread::sleep(Duration::from_millis(200));

    let record = store
        .get(&TaskId::new("refresh_downloads"))
        .expect("worker persisted the record");
    assert!(record.last_execution_at.is_some());
    assert!(!seen.lock().unwrap().is_empty());
}
