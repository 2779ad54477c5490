//! Tracker and rollover-loop tests against an in-memory store and a manual
//! clock.

use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta, Utc};
use daychain_core::{
  clock::ManualClock,
  criterion::{Criterion, CriterionKind, CriterionPatch},
  persist::{MemoryStore, StateStore},
  store::MultiChainState,
};
use uuid::Uuid;

use crate::{Error, RolloverTask, Tracker, TrackerConfig};

fn date(s: &str) -> NaiveDate { s.parse().expect("valid date") }

fn local(day: &str, hour: u32) -> NaiveDateTime {
  date(day).and_hms_opt(hour, 0, 0).expect("valid time")
}

fn goal(name: &str) -> Criterion {
  Criterion::new(name, "", CriterionKind::Goal, Utc::now())
}

struct Harness {
  store:   Arc<MemoryStore>,
  clock:   Arc<ManualClock>,
  tracker: Arc<Tracker<Arc<MemoryStore>>>,
}

async fn harness(now: NaiveDateTime) -> Harness {
  let store = Arc::new(MemoryStore::new());
  let clock = Arc::new(ManualClock::new(now));
  let tracker = Tracker::open(Arc::clone(&store), clock.clone(), &TrackerConfig::default())
    .await
    .expect("open tracker");
  Harness { store, clock, tracker: Arc::new(tracker) }
}

async fn stored(store: &MemoryStore) -> MultiChainState {
  let key = TrackerConfig::default().storage_key;
  let blob = store.get(&key).await.unwrap();
  MultiChainState::from_stored(blob.as_deref()).unwrap()
}

fn current_date(state: &MultiChainState, chain: Uuid) -> NaiveDate {
  state.chain(chain).unwrap().state.current_block().unwrap().date
}

// ─── Tracker ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn opens_empty_without_a_document() {
  let h = harness(local("2024-01-03", 9)).await;
  let snapshot = h.tracker.snapshot().await;
  assert!(snapshot.chains.is_empty());
  assert_eq!(snapshot.active_chain_id, None);
}

#[tokio::test]
async fn every_change_is_persisted_before_it_is_visible() {
  let h = harness(local("2024-01-03", 9)).await;
  let read = goal("read");

  let id = h
    .tracker
    .create_chain("Reading", None, date("2024-01-01"), vec![read.clone()])
    .await
    .unwrap();
  h.tracker.toggle_completion(read.id).await.unwrap();

  let snapshot = h.tracker.snapshot().await;
  assert_eq!(*snapshot, stored(&h.store).await);

  let chain = snapshot.chain(id).unwrap();
  assert_eq!(chain.state.blocks.len(), 10);
  assert_eq!(chain.state.current_block().unwrap().fill_percentage, 100);
}

#[tokio::test]
async fn snapshots_are_not_affected_by_later_writes() {
  let h = harness(local("2024-01-03", 9)).await;
  let before = h.tracker.snapshot().await;
  h.tracker
    .create_chain("Reading", None, date("2024-01-01"), vec![])
    .await
    .unwrap();
  assert!(before.chains.is_empty());
  assert_eq!(h.tracker.snapshot().await.chains.len(), 1);
}

#[tokio::test]
async fn reopening_restores_state() {
  let h = harness(local("2024-01-03", 9)).await;
  let read = goal("read");
  h.tracker
    .create_chain("Reading", Some("daily".into()), date("2024-01-01"), vec![read.clone()])
    .await
    .unwrap();
  h.tracker
    .update_criterion(read.id, CriterionPatch { name: Some("read 20 pages".into()), ..Default::default() })
    .await
    .unwrap();

  let reopened = Tracker::open(Arc::clone(&h.store), h.clock.clone(), &TrackerConfig::default())
    .await
    .unwrap();
  assert_eq!(*reopened.snapshot().await, *h.tracker.snapshot().await);
}

#[tokio::test]
async fn tick_rolls_over_at_midnight_only() {
  let h = harness(local("2024-01-03", 9)).await;
  h.tracker
    .create_chain("Reading", None, date("2024-01-01"), vec![goal("read")])
    .await
    .unwrap();

  assert!(h.tracker.tick().await.unwrap().is_none());

  h.clock.set(local("2024-01-04", 0));
  let rollover = h.tracker.tick().await.unwrap().expect("day turned over");
  assert_eq!(rollover.mined, [2]);
  assert_eq!(rollover.appended, [10]);

  assert!(h.tracker.tick().await.unwrap().is_none());
  let snapshot = h.tracker.snapshot().await;
  let current = snapshot.active_chain().unwrap().state.current_block().unwrap();
  assert_eq!(current.date, date("2024-01-04"));
  assert_eq!(stored(&h.store).await, *snapshot);
}

#[tokio::test]
async fn switching_catches_up_an_idle_chain() {
  let h = harness(local("2024-01-03", 9)).await;
  let a = h
    .tracker
    .create_chain("A", None, date("2024-01-01"), vec![goal("a")])
    .await
    .unwrap();
  h.tracker
    .create_chain("B", None, date("2024-01-01"), vec![goal("b")])
    .await
    .unwrap();

  h.clock.advance(TimeDelta::days(2));
  h.tracker.tick().await.unwrap();
  let stale = h.tracker.snapshot().await;
  assert_eq!(stale.chain(a).unwrap().state.current_block, Some(2));

  h.tracker.switch_chain(a).await.unwrap();
  let snapshot = h.tracker.snapshot().await;
  assert_eq!(snapshot.active_chain_id, Some(a));
  let current = snapshot.chain(a).unwrap().state.current_block().unwrap();
  assert_eq!(current.date, date("2024-01-05"));
  assert!(!current.mined);
}

#[tokio::test]
async fn deleting_the_active_chain_catches_up_its_successor() {
  let h = harness(local("2024-01-03", 9)).await;
  let a_goal = goal("a");
  let a = h
    .tracker
    .create_chain("A", None, date("2024-01-03"), vec![a_goal.clone()])
    .await
    .unwrap();
  let b = h
    .tracker
    .create_chain("B", None, date("2024-01-03"), vec![goal("b")])
    .await
    .unwrap();

  h.clock.advance(TimeDelta::days(2));
  h.tracker.tick().await.unwrap();
  assert_eq!(current_date(&*h.tracker.snapshot().await, a), date("2024-01-03"));

  h.tracker.delete_chain(b).await.unwrap();
  h.tracker.toggle_completion(a_goal.id).await.unwrap();

  let snapshot = h.tracker.snapshot().await;
  assert_eq!(snapshot.active_chain_id, Some(a));
  let state = &snapshot.chain(a).unwrap().state;
  let current = state.current_block().unwrap();
  assert_eq!(current.date, date("2024-01-05"));
  assert_eq!(current.fill_percentage, 100);

  let first = state.block(0).unwrap();
  assert!(first.mined);
  assert_eq!(first.fill_percentage, 0);
  assert_eq!(stored(&h.store).await, *snapshot);
}

#[tokio::test]
async fn archive_rename_and_delete_go_through() {
  let h = harness(local("2024-01-03", 9)).await;
  let (read, walk) = (goal("read"), goal("walk"));
  let id = h
    .tracker
    .create_chain("Habits", None, date("2024-01-03"), vec![read.clone()])
    .await
    .unwrap();

  h.tracker.add_criterion(walk.clone()).await.unwrap();
  h.tracker.toggle_completion(walk.id).await.unwrap();
  h.tracker.archive_criterion(read.id).await.unwrap();
  h.tracker.rename_chain(id, "Routine", None).await.unwrap();

  let snapshot = h.tracker.snapshot().await;
  let chain = snapshot.chain(id).unwrap();
  assert_eq!(chain.name, "Routine");
  assert_eq!(chain.state.active_criteria(), [walk]);
  assert_eq!(chain.state.current_block().unwrap().fill_percentage, 100);

  h.tracker.delete_chain(id).await.unwrap();
  assert!(stored(&h.store).await.chains.is_empty());
}

#[tokio::test]
async fn core_errors_surface_and_leave_state_alone() {
  let h = harness(local("2024-01-03", 9)).await;

  let err = h.tracker.switch_chain(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::Core(daychain_core::Error::ChainNotFound(_))));

  let err = h.tracker.toggle_completion(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::Core(daychain_core::Error::NoActiveChain)));

  let err = h
    .tracker
    .create_chain("Later", None, date("2024-02-01"), vec![])
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(daychain_core::Error::StartDateInFuture { .. })));

  assert_eq!(h.store.get(&TrackerConfig::default().storage_key).await.unwrap(), None);
}

#[tokio::test]
async fn corrupt_document_fails_to_open() {
  let store = Arc::new(MemoryStore::new());
  store
    .put(&TrackerConfig::default().storage_key, "{\"chains\":".into())
    .await
    .unwrap();

  let clock = Arc::new(ManualClock::new(local("2024-01-03", 9)));
  let result = Tracker::open(store, clock, &TrackerConfig::default()).await;
  assert!(matches!(
    result,
    Err(Error::Core(daychain_core::Error::Serialization(_)))
  ));
}

// ─── Rollover loop ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn loop_ticks_on_start_and_every_period() {
  let h = harness(local("2024-01-03", 9)).await;
  let id = h
    .tracker
    .create_chain("Reading", None, date("2024-01-01"), vec![goal("read")])
    .await
    .unwrap();

  // Asleep over midnight: the first tick catches up.
  h.clock.set(local("2024-01-04", 7));
  let task = RolloverTask::spawn(Arc::clone(&h.tracker), Duration::from_secs(60));
  tokio::time::sleep(Duration::from_secs(1)).await;
  assert_eq!(current_date(&*h.tracker.snapshot().await, id), date("2024-01-04"));

  h.clock.set(local("2024-01-05", 0));
  tokio::time::sleep(Duration::from_secs(60)).await;
  assert_eq!(current_date(&*h.tracker.snapshot().await, id), date("2024-01-05"));

  task.stop().await;

  // Stopped: time passes, nothing moves.
  h.clock.set(local("2024-01-07", 0));
  tokio::time::sleep(Duration::from_secs(600)).await;
  assert_eq!(current_date(&*h.tracker.snapshot().await, id), date("2024-01-05"));
}

// ─── Config ──────────────────────────────────────────────────────────────────

#[test]
fn config_defaults_apply_without_a_file() {
  let missing = std::env::temp_dir().join(format!("daychain-{}.toml", Uuid::new_v4()));
  let config = TrackerConfig::load(&missing).unwrap();
  assert_eq!(config.storage_key, "multi-blockchain-state");
  assert_eq!(config.tick_interval(), Duration::from_secs(60));
  assert_eq!(config.forward_days, 7);
}

#[test]
fn config_file_overrides_defaults() {
  let path = std::env::temp_dir().join(format!("daychain-{}.toml", Uuid::new_v4()));
  std::fs::write(
    &path,
    "store_path = \"/tmp/daychain.db\"\ntick_interval_secs = 5\nforward_days = 0\n",
  )
  .unwrap();

  let config = TrackerConfig::load(&path).unwrap();
  std::fs::remove_file(&path).ok();

  assert_eq!(config.store_path, std::path::PathBuf::from("/tmp/daychain.db"));
  assert_eq!(config.tick_interval(), Duration::from_secs(5));
  assert_eq!(config.forward_days, 0);
  assert_eq!(config.storage_key, "multi-blockchain-state");
}
