use super::*;
use crate::test_helpers::{peer_at, peer_state};

const NOW: i64 = 10_000;
const THRESHOLD: u64 = 3000;

fn own() -> Rectangle {
    Rectangle::new(0.0, 100.0, 0.0, 100.0)
}

fn table_with(peers: &[NodeState]) -> PeerTable {
    let mut table = PeerTable::new("a");
    for peer in peers {
        table.upsert(peer.clone());
    }
    table
}

fn ids(states: &[NodeState]) -> Vec<&str> {
    states.iter().map(|s| s.id.as_str()).collect()
}

#[test]
fn overlapping_peer_is_active() {
    let table = table_with(&[peer_at("b", 50.0, 0.0, 100.0, 100.0, NOW)]);
    assert_eq!(ids(&compute_active_peers(&own(), &table, NOW, THRESHOLD)), ["b"]);
}

#[test]
fn peer_moved_away_is_not_active() {
    let mut table = table_with(&[peer_at("b", 50.0, 0.0, 100.0, 100.0, NOW)]);
    table.upsert(peer_at("b", 200.0, 0.0, 100.0, 100.0, NOW + 1));
    assert!(compute_active_peers(&own(), &table, NOW + 1, THRESHOLD).is_empty());
}

#[test]
fn edge_touching_peer_is_not_active() {
    let table = table_with(&[peer_at("b", 100.0, 0.0, 100.0, 100.0, NOW)]);
    assert!(compute_active_peers(&own(), &table, NOW, THRESHOLD).is_empty());
}

#[test]
fn stale_peer_is_excluded_even_when_overlapping() {
    let table = table_with(&[
        peer_at("b", 50.0, 0.0, 100.0, 100.0, NOW - 3001),
        peer_at("c", 10.0, 10.0, 20.0, 20.0, NOW - 2999),
    ]);
    assert_eq!(ids(&compute_active_peers(&own(), &table, NOW, THRESHOLD)), ["c"]);
}

#[test]
fn active_peers_come_back_in_ascending_id_order() {
    let table = table_with(&[
        peer_at("d", 60.0, 60.0, 100.0, 100.0, NOW),
        peer_at("b", 50.0, 0.0, 100.0, 100.0, NOW),
        peer_at("c", -50.0, -50.0, 100.0, 100.0, NOW),
    ]);
    let first = compute_active_peers(&own(), &table, NOW, THRESHOLD);
    let second = compute_active_peers(&own(), &table, NOW, THRESHOLD);
    assert_eq!(ids(&first), ["b", "c", "d"]);
    assert_eq!(first, second);
}

#[test]
fn peer_rect_repairs_negative_extent() {
    let rect = peer_rect(&peer_at("b", 10.0, 20.0, -5.0, f64::NAN, NOW));
    assert_eq!(rect, Rectangle { left: 10.0, right: 10.0, top: 20.0, bottom: 20.0 });
}

#[test]
fn offsets_point_toward_the_peer() {
    let o = own();
    let left_above = layout_offset_for(&o, &peer_at("b", -50.0, -50.0, 100.0, 100.0, NOW), 0);
    assert_eq!(left_above, LayoutOffset { dx: -1.0, dy: -0.5 });

    let right_below = layout_offset_for(&o, &peer_at("b", 50.0, 50.0, 100.0, 100.0, NOW), 0);
    assert_eq!(right_below, LayoutOffset { dx: 1.0, dy: 0.5 });
}

#[test]
fn aligned_origin_counts_as_left_and_above() {
    let offset = layout_offset_for(&own(), &peer_state("b", NOW), 0);
    assert_eq!(offset, LayoutOffset { dx: -1.0, dy: -0.5 });
}

#[test]
fn offset_magnitude_grows_with_index() {
    let peer = peer_at("b", 50.0, 50.0, 100.0, 100.0, NOW);
    let offsets: Vec<LayoutOffset> = (0..3).map(|i| layout_offset_for(&own(), &peer, i)).collect();
    assert_eq!(
        offsets,
        vec![
            LayoutOffset { dx: 1.0, dy: 0.5 },
            LayoutOffset { dx: 2.0, dy: 1.0 },
            LayoutOffset { dx: 3.0, dy: 1.5 },
        ]
    );
}

#[test]
fn layout_assigns_distinct_offsets_in_order() {
    let table = table_with(&[
        peer_at("d", 60.0, 60.0, 100.0, 100.0, NOW),
        peer_at("b", 50.0, -20.0, 100.0, 100.0, NOW),
        peer_at("c", -50.0, 30.0, 100.0, 100.0, NOW),
    ]);
    let layouts = layout_active_peers(&own(), compute_active_peers(&own(), &table, NOW, THRESHOLD));

    let summary: Vec<(&str, usize, Horizontal, Vertical)> =
        layouts.iter().map(|l| (l.peer.id.as_str(), l.index, l.horizontal, l.vertical)).collect();
    assert_eq!(
        summary,
        vec![
            ("b", 0, Horizontal::Right, Vertical::Above),
            ("c", 1, Horizontal::Left, Vertical::Below),
            ("d", 2, Horizontal::Right, Vertical::Below),
        ]
    );
    for pair in layouts.windows(2) {
        assert!(pair[1].offset.dx.abs() > pair[0].offset.dx.abs());
        assert!(pair[1].offset.dy.abs() > pair[0].offset.dy.abs());
    }
}

#[test]
fn layout_of_nothing_is_empty() {
    assert!(layout_active_peers(&own(), Vec::new()).is_empty());
}
