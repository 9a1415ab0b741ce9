use glam::Vec2;

use crate::ecs::ActorId;

/// Position of a running actor, captured once per tick for proximity queries.
/// Stored alongside the spatial hash so the query pass never touches the world.
#[derive(Debug, Clone, Copy)]
pub struct ActorSnapshot {
    pub actor: ActorId,
    pub pos: Vec2,
}

/// Spatial hash grid for neighbour queries.
///
/// Cell size should be at least the query radius so the 3×3 neighbourhood
/// covers it. Distinct cells can share a bucket, so callers must filter by
/// distance and tolerate seeing the same index twice.
pub struct SpatialHash {
    inv_cell_size: f32,
    table_size: usize,
    /// Each bucket holds snapshot indices. Cleared, not freed, on rebuild.
    buckets: Vec<Vec<u32>>,
}

impl SpatialHash {
    pub fn new(cell_size: f32, table_size: usize) -> Self {
        let table_size = table_size.max(1);
        let mut buckets = Vec::with_capacity(table_size);
        for _ in 0..table_size {
            buckets.push(Vec::with_capacity(4));
        }
        Self {
            inv_cell_size: 1.0 / cell_size.max(f32::EPSILON),
            table_size,
            buckets,
        }
    }

    /// Clear all buckets. Call at start of each rebuild.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    pub fn insert(&mut self, pos: Vec2, index: u32) {
        let hash = self.hash(pos);
        if let Some(bucket) = self.buckets.get_mut(hash) {
            bucket.push(index);
        }
    }

    /// Query all entries in the same cell and the 8 surrounding cells.
    pub fn query_neighbors(&self, pos: Vec2, mut callback: impl FnMut(u32)) {
        let (cx, cy) = self.cell_coords(pos);
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                let hash = self.hash_cell(cx.wrapping_add(dx), cy.wrapping_add(dy));
                for &index in self.buckets.get(hash).into_iter().flatten() {
                    callback(index);
                }
            }
        }
    }

    /// Rebuild from a fresh set of snapshots; indices refer into `snapshots`.
    pub fn rebuild(&mut self, snapshots: &[ActorSnapshot]) {
        self.clear();
        for (idx, snap) in snapshots.iter().enumerate() {
            self.insert(snap.pos, idx as u32);
        }
    }

    fn cell_coords(&self, pos: Vec2) -> (i32, i32) {
        let cx = (pos.x * self.inv_cell_size).floor() as i32;
        let cy = (pos.y * self.inv_cell_size).floor() as i32;
        (cx, cy)
    }

    fn hash(&self, pos: Vec2) -> usize {
        let (cx, cy) = self.cell_coords(pos);
        self.hash_cell(cx, cy)
    }

    fn hash_cell(&self, cx: i32, cy: i32) -> usize {
        let h = (cx as u32).wrapping_mul(73856093) ^ (cy as u32).wrapping_mul(19349663);
        (h as usize) % self.table_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_query() {
        let mut grid = SpatialHash::new(160.0, 256);
        grid.insert(Vec2::new(100.0, 100.0), 0);
        grid.insert(Vec2::new(170.0, 105.0), 1);
        grid.insert(Vec2::new(900.0, 500.0), 2);

        let mut found = Vec::new();
        grid.query_neighbors(Vec2::new(105.0, 102.0), |idx| found.push(idx));

        assert!(found.contains(&0));
        assert!(found.contains(&1));
    }

    #[test]
    fn clear_and_reuse() {
        let mut grid = SpatialHash::new(160.0, 256);
        grid.insert(Vec2::new(50.0, 50.0), 42);
        grid.clear();

        let mut found = Vec::new();
        grid.query_neighbors(Vec2::new(50.0, 50.0), |idx| found.push(idx));
        assert!(found.is_empty());
    }
}
