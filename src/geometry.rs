use glam::Vec2;

/// Determinant magnitude below which two segments count as parallel.
pub const CROSSING_EPSILON: f32 = 1e-4;

/// Rectangular clamp region for sprite positions: `[0, max.x] × [0, max.y]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub max: Vec2,
}

impl Bounds {
    /// Bounds for a stage of `width × height` holding sprites of `size` pixels.
    /// A stage smaller than the sprite collapses to the origin on that axis.
    pub fn for_stage(width: f32, height: f32, size: f32) -> Self {
        Self {
            max: Vec2::new((width - size).max(0.0), (height - size).max(0.0)),
        }
    }

    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        clamp_to_bounds(pos, *self)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= self.max.x && pos.y <= self.max.y
    }
}

/// Clamp a position into the stage rectangle.
pub fn clamp_to_bounds(pos: Vec2, bounds: Bounds) -> Vec2 {
    // Hand-built bounds may carry a negative max.
    let max = bounds.max.max(Vec2::ZERO);
    Vec2::new(pos.x.clamp(0.0, max.x), pos.y.clamp(0.0, max.y))
}

/// Position and heading of a sprite. Rotation is in degrees and never wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec2,
    pub rotation: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, rotation: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            rotation,
        }
    }

    /// Unit vector along the current heading (0° points along +x).
    pub fn heading(&self) -> Vec2 {
        let theta = self.rotation.to_radians();
        Vec2::new(theta.cos(), theta.sin())
    }

    /// Position after walking `steps` along the heading, clamped to `bounds`.
    pub fn advanced(&self, steps: f32, bounds: Bounds) -> Vec2 {
        bounds.clamp(self.position + self.heading() * steps)
    }
}

/// A straight path from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction() == Vec2::ZERO
    }
}

/// Test whether two segments share at least one point.
///
/// Zero-length segments never cross. Non-parallel segments are solved with the
/// usual two-parameter formula and cross iff both parameters land in `[0, 1]`.
/// Parallel segments cross only when they are collinear and their projections
/// onto the shared direction overlap by more than a single point.
pub fn segments_cross(a: Segment, b: Segment, epsilon: f32) -> bool {
    if a.is_degenerate() || b.is_degenerate() {
        return false;
    }

    let r = a.direction();
    let s = b.direction();
    let det = r.perp_dot(s);
    let qp = b.start - a.start;

    if det.abs() > epsilon {
        let t = qp.perp_dot(s) / det;
        let u = qp.perp_dot(r) / det;
        return (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u);
    }

    // Parallel: both endpoints of `b` must lie on the line through `a`.
    let collinear = r.perp_dot(qp).abs() <= epsilon && r.perp_dot(b.end - a.start).abs() <= epsilon;
    if !collinear {
        return false;
    }

    let axis = r.normalize();
    let (a0, a1) = (a.start.dot(axis), a.end.dot(axis));
    let (b0, b1) = (b.start.dot(axis), b.end.dot(axis));
    a0.max(a1) > b0.min(b1) && b0.max(b1) > a0.min(a1)
}
