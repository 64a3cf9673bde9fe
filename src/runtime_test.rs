use std::sync::Mutex;

use super::*;
use crate::channel::MemoryChannel;
use crate::liveness::ManualClock;
use crate::test_helpers::test_node;

const START_MS: i64 = 1_000_000;
const TICK: Duration = Duration::from_millis(10);

fn started_node(channel: &MemoryChannel, clock: &ManualClock, n: u128) -> Arc<SyncNode> {
    let node = Arc::new(test_node(channel, clock, n));
    node.start().unwrap();
    node
}

// With a frozen clock every publish bumps the timestamp by exactly one, so
// the timestamp counts publications.
fn publications(node: &SyncNode) -> i64 {
    node.own_state().timestamp - START_MS
}

#[tokio::test]
async fn heartbeat_republishes_without_changes() {
    let channel = MemoryChannel::new();
    let clock = ManualClock::new(START_MS);
    let node = started_node(&channel, &clock, 1);
    assert_eq!(publications(&node), 0);

    let timer = spawn_heartbeat(Arc::clone(&node), TICK);
    tokio::time::sleep(TICK * 6).await;

    assert!(publications(&node) >= 2);
    timer.cancel();
}

#[tokio::test]
async fn first_heartbeat_waits_one_period() {
    let channel = MemoryChannel::new();
    let clock = ManualClock::new(START_MS);
    let node = started_node(&channel, &clock, 1);

    let _timer = spawn_heartbeat(Arc::clone(&node), Duration::from_secs(60));
    tokio::time::sleep(TICK).await;

    assert_eq!(publications(&node), 0);
}

#[tokio::test]
async fn dropped_timer_stops_publishing() {
    let channel = MemoryChannel::new();
    let clock = ManualClock::new(START_MS);
    let node = started_node(&channel, &clock, 1);

    let timer = spawn_heartbeat(Arc::clone(&node), TICK);
    tokio::time::sleep(TICK * 3).await;
    drop(timer);
    let frozen = publications(&node);
    tokio::time::sleep(TICK * 5).await;

    assert_eq!(publications(&node), frozen);
}

#[tokio::test]
async fn heartbeat_ends_after_shutdown() {
    let channel = MemoryChannel::new();
    let clock = ManualClock::new(START_MS);
    let node = started_node(&channel, &clock, 1);

    let timer = spawn_heartbeat(Arc::clone(&node), TICK);
    node.shutdown();
    tokio::time::sleep(TICK * 5).await;

    assert!(timer.is_finished());
    assert!(channel.is_empty());
}

#[tokio::test]
async fn heartbeat_evicts_quiet_peers() {
    let channel = MemoryChannel::new();
    let clock = ManualClock::new(START_MS);
    let a = started_node(&channel, &clock, 1);
    let b = started_node(&channel, &clock, 2);
    assert_eq!(a.peer_count(), 1);
    drop(b);

    let _timer = spawn_heartbeat(Arc::clone(&a), TICK);
    clock.advance(3001);
    tokio::time::sleep(TICK * 4).await;

    assert_eq!(a.peer_count(), 0);
}

#[tokio::test]
async fn poller_publishes_window_moves() {
    let channel = MemoryChannel::new();
    let clock = ManualClock::new(START_MS);
    let node = started_node(&channel, &clock, 1);
    let position = Arc::new(Mutex::new(WindowGeometry::new(10.0, 20.0, 300.0, 200.0)));

    let reader = Arc::clone(&position);
    let _poller = spawn_geometry_poller(Arc::clone(&node), TICK, move || *reader.lock().unwrap());
    tokio::time::sleep(TICK * 3).await;
    assert!((node.own_state().window_x - 10.0).abs() < f64::EPSILON);
    let after_first = publications(&node);

    tokio::time::sleep(TICK * 3).await;
    assert_eq!(publications(&node), after_first);

    position.lock().unwrap().x = 400.0;
    tokio::time::sleep(TICK * 3).await;
    assert!((node.own_state().window_x - 400.0).abs() < f64::EPSILON);
    assert_eq!(publications(&node), after_first + 1);
}

#[tokio::test]
async fn poller_ends_after_shutdown() {
    let channel = MemoryChannel::new();
    let clock = ManualClock::new(START_MS);
    let node = started_node(&channel, &clock, 1);
    node.shutdown();

    let poller = spawn_geometry_poller(Arc::clone(&node), TICK, || WindowGeometry::new(0.0, 0.0, 1.0, 1.0));
    tokio::time::sleep(TICK * 3).await;

    assert!(poller.is_finished());
}
