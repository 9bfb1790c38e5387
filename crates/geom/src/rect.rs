use super::Point;

/// A rectangle of terminal cells, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub tl: Point,
    /// Width in cells.
    pub w: u32,
    /// Height in cells.
    pub h: u32,
}

impl Rect {
    /// Construct a rectangle.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self {
            tl: Point { x, y },
            w,
            h,
        }
    }

    /// Does the half-open area `[x, x+w) × [y, y+h)` contain `p`?
    pub fn contains_point(&self, p: impl Into<Point>) -> bool {
        let p = p.into();
        p.x >= self.tl.x
            && p.x - self.tl.x < self.w
            && p.y >= self.tl.y
            && p.y - self.tl.y < self.h
    }

    /// The overlap between two rectangles, if any.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let x1 = self.tl.x.max(other.tl.x);
        let y1 = self.tl.y.max(other.tl.y);
        let x2 = (u64::from(self.tl.x) + u64::from(self.w))
            .min(u64::from(other.tl.x) + u64::from(other.w));
        let y2 = (u64::from(self.tl.y) + u64::from(self.h))
            .min(u64::from(other.tl.y) + u64::from(other.h));
        if u64::from(x1) >= x2 || u64::from(y1) >= y2 {
            return None;
        }
        Some(Self::new(x1, y1, (x2 - u64::from(x1)) as u32, (y2 - u64::from(y1)) as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(38, 11, 6, 3);
        assert!(r.contains_point((38, 11)));
        assert!(r.contains_point((40, 12)));
        assert!(r.contains_point((43, 13)));
        assert!(!r.contains_point((44, 13)));
        assert!(!r.contains_point((43, 14)));
        assert!(!r.contains_point((37, 12)));
    }

    #[test]
    fn intersect() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(
            a.intersect(&Rect::new(5, 5, 10, 10)),
            Some(Rect::new(5, 5, 5, 5))
        );
        assert_eq!(a.intersect(&Rect::new(10, 0, 3, 3)), None);
        assert_eq!(a.intersect(&Rect::new(2, 2, 0, 3)), None);
    }
}
