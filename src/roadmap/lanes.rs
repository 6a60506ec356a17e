//! Greedy interval scheduling of phases into lanes.

use std::collections::HashMap;
use std::hash::Hash;

/// An item to place: its key and its inclusive `[start, end]` bucket indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneItem<K> {
    pub key: K,
    pub start: usize,
    pub end: usize,
}

impl<K> LaneItem<K> {
    pub fn new(key: K, start: usize, end: usize) -> Self {
        Self { key, start, end }
    }
}

/// Lane of every item plus the number of lanes the group needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneAssignment<K: Eq + Hash> {
    pub lanes: HashMap<K, usize>,
    /// Never zero, so an empty row still has one lane of height.
    pub total_lanes: usize,
}

impl<K: Eq + Hash> LaneAssignment<K> {
    pub fn lane_of(&self, key: &K) -> Option<usize> {
        self.lanes.get(key).copied()
    }
}

/// Assign each item to the lowest lane whose last occupant ended strictly
/// before the item starts.
///
/// Items are stably sorted by `(start, end)`, so identical intervals keep their
/// input order. First-fit in start order yields the minimum lane count for
/// interval sets.
pub fn assign_lanes<K: Clone + Eq + Hash>(items: &[LaneItem<K>]) -> LaneAssignment<K> {
    let mut order: Vec<&LaneItem<K>> = items.iter().collect();
    order.sort_by_key(|item| (item.start, item.end));

    let mut lane_ends: Vec<usize> = Vec::new();
    let mut lanes = HashMap::with_capacity(items.len());

    for item in order {
        let lane = match lane_ends.iter().position(|&end| end < item.start) {
            Some(free) => {
                lane_ends[free] = item.end;
                free
            }
            None => {
                lane_ends.push(item.end);
                lane_ends.len() - 1
            }
        };
        lanes.insert(item.key.clone(), lane);
    }

    LaneAssignment {
        lanes,
        total_lanes: lane_ends.len().max(1),
    }
}
