use crate::geometry::{segments_cross, Segment};

/// Pairs of trajectory indices whose paths cross, in the order they are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapPlan {
    pub pairs: Vec<(usize, usize)>,
}

impl SwapPlan {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Whether index `i` takes part in at least one swap.
    pub fn involves(&self, i: usize) -> bool {
        self.pairs.iter().any(|&(a, b)| a == i || b == i)
    }

    /// Apply every pair swap to `items` in plan order.
    ///
    /// Pairs are independent, so an index that appears in several pairs is
    /// swapped several times and the effects compound.
    pub fn apply<T>(&self, items: &mut [T]) {
        for &(a, b) in &self.pairs {
            if a < items.len() && b < items.len() {
                items.swap(a, b);
            }
        }
    }
}

/// Find every crossing pair among `paths` (current position → projected end).
///
/// Callers pass only actors that have a script. Pairs come out in ascending
/// `(i, j)` order with `i < j`, each at most once.
pub fn resolve(paths: &[Segment], epsilon: f32) -> SwapPlan {
    let mut pairs = Vec::new();
    for (i, a) in paths.iter().enumerate() {
        for (j, b) in paths.iter().enumerate().skip(i + 1) {
            if segments_cross(*a, *b, epsilon) {
                pairs.push((i, j));
            }
        }
    }
    SwapPlan { pairs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CROSSING_EPSILON;
    use glam::Vec2;

    fn seg(x0: f32, y0: f32, x1: f32, y1: f32) -> Segment {
        Segment::new(Vec2::new(x0, y0), Vec2::new(x1, y1))
    }

    #[test]
    fn crossing_diagonals_swap() {
        let paths = [seg(0.0, 0.0, 100.0, 100.0), seg(100.0, 0.0, 0.0, 100.0)];
        let plan = resolve(&paths, CROSSING_EPSILON);
        assert_eq!(plan.pairs, vec![(0, 1)]);

        let mut scripts = vec!["a", "b"];
        plan.apply(&mut scripts);
        assert_eq!(scripts, vec!["b", "a"]);
    }

    #[test]
    fn parallel_paths_leave_plan_empty() {
        let paths = [seg(0.0, 0.0, 100.0, 0.0), seg(0.0, 50.0, 100.0, 50.0)];
        assert!(resolve(&paths, CROSSING_EPSILON).is_empty());
    }

    #[test]
    fn three_way_crossings_compound() {
        // All three pass through (50, 50).
        let paths = [
            seg(0.0, 0.0, 100.0, 100.0),
            seg(100.0, 0.0, 0.0, 100.0),
            seg(50.0, 0.0, 50.0, 100.0),
        ];
        let plan = resolve(&paths, CROSSING_EPSILON);
        assert_eq!(plan.pairs, vec![(0, 1), (0, 2), (1, 2)]);
        assert!(plan.involves(2));

        let mut items = vec!['a', 'b', 'c'];
        plan.apply(&mut items);
        // (0,1): b a c; (0,2): c a b; (1,2): c b a
        assert_eq!(items, vec!['c', 'b', 'a']);
    }

    #[test]
    fn stationary_actor_never_crosses() {
        let paths = [seg(50.0, 50.0, 50.0, 50.0), seg(0.0, 0.0, 100.0, 100.0)];
        assert!(resolve(&paths, CROSSING_EPSILON).is_empty());
    }
}
