use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in absolute layout pixels, origin top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn x2(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge
    pub fn y2(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Zero or negative area
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Half-open overlap test. Touching edges do not overlap, and an empty
    /// rectangle overlaps nothing.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        !(self.x2() <= other.x
            || self.x >= other.x2()
            || self.y2() <= other.y
            || self.y >= other.y2())
    }

    /// Whether this rectangle spans at least `area`, with its origin within
    /// `tolerance` pixels of the area's origin on both axes
    pub fn covers(&self, area: &Rect, tolerance: i32) -> bool {
        let Ok(tolerance) = u32::try_from(tolerance) else {
            return false;
        };
        self.width >= area.width
            && self.height >= area.height
            && self.x.abs_diff(area.x) <= tolerance
            && self.y.abs_diff(area.y) <= tolerance
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_rects_never_intersect() {
        let a = Rect::new(0, 40, 200, 200);
        let b = Rect::new(0, 0, 1920, 34);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));

        let left = Rect::new(0, 0, 100, 100);
        let right = Rect::new(500, 0, 100, 100);
        assert!(!left.intersects(&right));
        assert!(!right.intersects(&left));
    }

    #[test]
    fn test_rect_intersects_itself() {
        let r = Rect::new(12, -40, 300, 20);
        assert!(r.intersects(&r));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let bar = Rect::new(0, 0, 1920, 34);
        let below = Rect::new(0, 34, 1920, 100);
        assert!(!bar.intersects(&below));
        assert!(!below.intersects(&bar));

        let beside = Rect::new(1920, 0, 10, 10);
        assert!(!bar.intersects(&beside));
    }

    #[test]
    fn test_empty_rect_never_overlaps() {
        let area = Rect::new(0, 0, 100, 100);
        let point = Rect::new(50, 50, 0, 0);
        let line = Rect::new(10, 10, 50, 0);
        assert!(!point.intersects(&area));
        assert!(!area.intersects(&line));
        assert!(!point.intersects(&point));
    }

    #[test]
    fn test_partial_overlap() {
        let bar = Rect::new(0, 0, 1920, 34);
        let window = Rect::new(100, 0, 400, 50);
        assert!(bar.intersects(&window));
        assert!(window.intersects(&bar));
    }

    #[test]
    fn test_covers_with_tolerance() {
        let monitor = Rect::new(1920, 0, 2560, 1440);
        assert!(Rect::new(1921, 1, 2560, 1440).covers(&monitor, 1));
        assert!(!Rect::new(1922, 0, 2560, 1440).covers(&monitor, 1));
        assert!(!Rect::new(1920, 0, 2559, 1440).covers(&monitor, 1));
        assert!(Rect::new(1920, 0, 2560, 1440).covers(&monitor, 0));
    }

    #[test]
    fn test_covers_far_origin_does_not_wrap() {
        let monitor = Rect::new(0, 0, 1920, 1080);
        assert!(!Rect::new(i32::MIN, 0, 1920, 1080).covers(&monitor, 1));
        assert!(!Rect::new(0, i32::MIN, 1920, 1080).covers(&monitor, 1));
        assert!(!Rect::new(i32::MAX, 0, 1920, 1080).covers(&Rect::new(i32::MIN, 0, 10, 10), 1));
        assert!(!Rect::new(0, 0, 1920, 1080).covers(&monitor, -1));
    }
}
