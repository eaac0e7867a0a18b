use serde::{Deserialize, Serialize};

/// An axis-aligned box in layout coordinates.
#[derive(Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Rect {
        Rect { x, y, width, height }
    }

    pub fn right(&self) -> i32 { self.x.saturating_add(self.width) }

    pub fn bottom(&self) -> i32 { self.y.saturating_add(self.height) }

    pub fn is_empty(&self) -> bool { self.width <= 0 || self.height <= 0 }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            i64::from(self.width) * i64::from(self.height)
        }
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` lies entirely inside this box. An empty box is
    /// contained anywhere its origin is.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }

    pub fn intersects(&self, other: &Rect) -> bool { self.intersection(other).is_some() }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    /// Moves (and if needed shrinks) this box so it fits inside `bounds`.
    /// Boxes already inside `bounds` come back unchanged.
    pub fn clamp_within(&self, bounds: &Rect) -> Rect {
        if bounds.contains(self) {
            return *self;
        }
        let width = self.width.min(bounds.width).max(0);
        let height = self.height.min(bounds.height).max(0);
        let x = self.x.clamp(bounds.x, (bounds.right() - width).max(bounds.x));
        let y = self.y.clamp(bounds.y, (bounds.bottom() - height).max(bounds.y));
        Rect { x, y, width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_overlapping_boxes() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 25, 100, 100);
        assert_eq!(a.intersection(&b), Some(Rect::new(50, 25, 50, 75)));
        assert_eq!(b.intersection(&a), a.intersection(&b));
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(100, 0, 100, 100);
        assert_eq!(a.intersection(&b), None);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn containment() {
        let screen = Rect::new(0, 0, 1920, 1080);
        assert!(screen.contains(&Rect::new(0, 30, 1920, 1050)));
        assert!(!screen.contains(&Rect::new(-1, 30, 10, 10)));
        assert!(screen.contains_point(1919, 1079));
        assert!(!screen.contains_point(1920, 0));
    }

    #[test]
    fn clamp_leaves_contained_box_alone() {
        let bounds = Rect::new(0, 30, 1920, 1050);
        let inside = Rect::new(100, 100, 400, 300);
        assert_eq!(inside.clamp_within(&bounds), inside);
    }

    #[test]
    fn clamp_moves_overflowing_box_inside() {
        let bounds = Rect::new(0, 30, 1920, 1050);
        assert_eq!(
            Rect::new(50, 0, 400, 300).clamp_within(&bounds),
            Rect::new(50, 30, 400, 300)
        );
        assert_eq!(
            Rect::new(1800, 1000, 400, 300).clamp_within(&bounds),
            Rect::new(1520, 780, 400, 300)
        );
    }

    #[test]
    fn clamp_shrinks_oversized_box() {
        let bounds = Rect::new(0, 0, 800, 600);
        assert_eq!(
            Rect::new(-10, -10, 1000, 700).clamp_within(&bounds),
            Rect::new(0, 0, 800, 600)
        );
    }

    #[test]
    fn empty_boxes_have_no_area() {
        assert_eq!(Rect::new(0, 0, 0, 10).area(), 0);
        assert_eq!(Rect::new(0, 0, -5, 10).area(), 0);
        assert_eq!(Rect::new(0, 0, 5, 10).area(), 50);
    }
}
