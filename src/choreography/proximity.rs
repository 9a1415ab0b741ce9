use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::ecs::ActorId;
use crate::spatial::{ActorSnapshot, SpatialHash};

/// Spatial hash table size; small stages rarely hold more than a few dozen actors.
const SPATIAL_TABLE_SIZE: usize = 256;

/// Unordered actor pair with a canonical order so it can live in a set.
pub fn ordered_pair(a: ActorId, b: ActorId) -> (ActorId, ActorId) {
    if a.to_bits() <= b.to_bits() {
        (a, b)
    } else {
        (b, a)
    }
}

/// In-flight choreography: running actors that come within `radius` of each
/// other swap their scripts once, and may swap again only after separating.
pub struct ProximityTracker {
    radius: f32,
    grid: SpatialHash,
    snapshots: Vec<ActorSnapshot>,
    /// Pairs already swapped and not yet separated.
    marked: HashSet<(ActorId, ActorId)>,
    /// Swaps decided this tick, drained by the caller.
    commands: Vec<(ActorId, ActorId)>,
}

impl ProximityTracker {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            // Cell size 2x the radius so the 3x3 query always covers it.
            grid: SpatialHash::new(radius * 2.0, SPATIAL_TABLE_SIZE),
            snapshots: Vec::new(),
            marked: HashSet::new(),
            commands: Vec::new(),
        }
    }

    /// Forget all marks, e.g. at the start of a new run.
    pub fn reset(&mut self) {
        self.marked.clear();
        self.commands.clear();
        self.snapshots.clear();
        self.grid.clear();
    }

    pub fn is_marked(&self, a: ActorId, b: ActorId) -> bool {
        self.marked.contains(&ordered_pair(a, b))
    }

    /// Read pass over this tick's positions. Returns the pairs to swap now;
    /// each returned pair is marked before this call returns.
    pub fn update(&mut self, positions: impl IntoIterator<Item = (ActorId, Vec2)>) -> Vec<(ActorId, ActorId)> {
        self.snapshots.clear();
        self.snapshots
            .extend(positions.into_iter().map(|(actor, pos)| ActorSnapshot { actor, pos }));
        self.grid.rebuild(&self.snapshots);

        self.release_separated();
        self.detect_new();

        std::mem::take(&mut self.commands)
    }

    /// Unmark pairs that drifted apart or are no longer running.
    fn release_separated(&mut self) {
        let by_actor: HashMap<ActorId, Vec2> = self.snapshots.iter().map(|s| (s.actor, s.pos)).collect();
        let radius_sq = self.radius * self.radius;
        self.marked.retain(|(a, b)| match (by_actor.get(a), by_actor.get(b)) {
            (Some(pa), Some(pb)) => pa.distance_squared(*pb) <= radius_sq,
            _ => false,
        });
    }

    fn detect_new(&mut self) {
        let radius_sq = self.radius * self.radius;
        let count = self.snapshots.len();
        for my_idx in 0..count {
            let me = self.snapshots[my_idx];
            let snapshots = &self.snapshots;
            let marked = &mut self.marked;
            let commands = &mut self.commands;

            self.grid.query_neighbors(me.pos, |neighbor_idx| {
                let ni = neighbor_idx as usize;
                // Each pair once; buckets may repeat an index.
                if ni <= my_idx || ni >= count {
                    return;
                }
                let them = snapshots[ni];
                if me.pos.distance_squared(them.pos) >= radius_sq {
                    return;
                }
                let pair = ordered_pair(me.actor, them.actor);
                if marked.insert(pair) {
                    commands.push(pair);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actors(n: usize) -> Vec<ActorId> {
        let mut world = hecs::World::new();
        (0..n).map(|_| world.spawn(())).collect()
    }

    #[test]
    fn close_pair_swaps_once_until_separated() {
        let ids = actors(2);
        let (a, b) = (ids[0], ids[1]);
        let mut tracker = ProximityTracker::new(80.0);

        let far = tracker.update([(a, Vec2::new(0.0, 0.0)), (b, Vec2::new(200.0, 0.0))]);
        assert!(far.is_empty());

        let near = tracker.update([(a, Vec2::new(0.0, 0.0)), (b, Vec2::new(50.0, 0.0))]);
        assert_eq!(near, vec![ordered_pair(a, b)]);

        let still_near = tracker.update([(a, Vec2::new(0.0, 0.0)), (b, Vec2::new(40.0, 0.0))]);
        assert!(still_near.is_empty());
        assert!(tracker.is_marked(a, b));

        let apart = tracker.update([(a, Vec2::new(0.0, 0.0)), (b, Vec2::new(120.0, 0.0))]);
        assert!(apart.is_empty());
        assert!(!tracker.is_marked(a, b));

        let again = tracker.update([(a, Vec2::new(0.0, 0.0)), (b, Vec2::new(10.0, 0.0))]);
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn finished_actor_is_released() {
        let ids = actors(2);
        let mut tracker = ProximityTracker::new(80.0);
        tracker.update([(ids[0], Vec2::ZERO), (ids[1], Vec2::new(5.0, 5.0))]);
        assert!(tracker.is_marked(ids[0], ids[1]));
        tracker.update([(ids[0], Vec2::ZERO)]);
        assert!(!tracker.is_marked(ids[0], ids[1]));
    }

    #[test]
    fn crowd_marks_every_close_pair() {
        let ids = actors(3);
        let mut tracker = ProximityTracker::new(80.0);
        let swaps = tracker.update([
            (ids[0], Vec2::new(100.0, 100.0)),
            (ids[1], Vec2::new(130.0, 100.0)),
            (ids[2], Vec2::new(160.0, 100.0)),
        ]);
        assert_eq!(swaps.len(), 3);
    }
}
