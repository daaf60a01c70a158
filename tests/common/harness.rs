//! Coordinator wired to a manual clock, an in-memory store and an in-memory
//! publisher

use std::sync::Arc;
use windowed_batcher::bootstrap::CoordinatorSystem;
use windowed_batcher::clock::ManualClock;
use windowed_batcher::config::CoordinatorConfig;
use windowed_batcher::publish::InMemoryPublisher;
use windowed_batcher::records::{BatchId, Event, Mention};
use windowed_batcher::store::{BatchStore, InMemoryBatchStore};
use windowed_batcher::transform::DocumentTransformer;

use super::faulty_store::FaultyStore;

pub const WINDOW_MS: i64 = 60_000;
pub const GRACE_MS: i64 = 10_000;

pub struct TestCoordinator<S> {
    pub clock: Arc<ManualClock>,
    pub store: Arc<S>,
    pub publisher: Arc<InMemoryPublisher>,
    pub system: CoordinatorSystem<S>,
}

/// Default batch timings with a 1 ms retry interval
pub fn test_config() -> CoordinatorConfig {
    let mut config = CoordinatorConfig::default();
    config.retry.interval_ms = 1;
    config
}

pub fn coordinator() -> TestCoordinator<InMemoryBatchStore> {
    let clock = Arc::new(ManualClock::new(0));
    let store = Arc::new(InMemoryBatchStore::new(clock.clone()));
    build(clock, store)
}

pub fn faulty_coordinator() -> TestCoordinator<FaultyStore> {
    let clock = Arc::new(ManualClock::new(0));
    let store = Arc::new(FaultyStore::new(InMemoryBatchStore::new(clock.clone())));
    build(clock, store)
}

fn build<S: BatchStore + 'static>(clock: Arc<ManualClock>, store: Arc<S>) -> TestCoordinator<S> {
    let publisher = Arc::new(InMemoryPublisher::new());
    let system = CoordinatorSystem::new(
        store.clone(),
        clock.clone(),
        publisher.clone(),
        Arc::new(DocumentTransformer::new()),
        test_config(),
    );

    TestCoordinator {
        clock,
        store,
        publisher,
        system,
    }
}

pub fn batch(id: &str) -> BatchId {
    BatchId::new(id).expect("valid batch id")
}

pub fn event(global_event_id: i64) -> Event {
    Event {
        global_event_id,
        day: Some(20240115),
        date_added: Some(20240115103000),
        ..Event::default()
    }
}

pub fn mention(global_event_id: i64, mention_identifier: &str) -> Mention {
    Mention {
        global_event_id,
        mention_identifier: mention_identifier.to_string(),
        mention_time_date: Some(20240115103000),
        ..Mention::default()
    }
}
