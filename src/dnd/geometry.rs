/// A pointer position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// An axis-aligned rectangle; `left`/`top` inclusive, right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left, self.top),
            Point::new(self.right(), self.top),
            Point::new(self.left, self.bottom()),
            Point::new(self.right(), self.bottom()),
        ]
    }

    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.right().min(other.right()) - self.left.max(other.left);
        let h = self.bottom().min(other.bottom()) - self.top.max(other.top);
        if w <= 0.0 || h <= 0.0 { 0.0 } else { w * h }
    }

    /// Overlap divided by union, in `[0, 1]`
    pub fn intersection_ratio(&self, other: &Rect) -> f64 {
        let inter = self.intersection_area(other);
        if inter == 0.0 {
            return 0.0;
        }
        let union = self.area() + other.area() - inter;
        if union <= 0.0 { 0.0 } else { inter / union }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 2.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(9.5, 1.9)));
        assert!(!r.contains(Point::new(10.0, 1.0)));
        assert!(!r.contains(Point::new(5.0, 2.0)));
    }

    #[test]
    fn intersection_ratio_of_identical_rects_is_one() {
        let r = Rect::new(3.0, 4.0, 10.0, 1.0);
        assert_eq!(r.intersection_ratio(&r), 1.0);
    }

    #[test]
    fn intersection_ratio_half_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 2.0);
        let b = Rect::new(0.0, 1.0, 10.0, 2.0);
        // overlap 10, union 30
        assert!((a.intersection_ratio(&b) - 1.0 / 3.0).abs() < 1e-9);
        let far = Rect::new(0.0, 5.0, 10.0, 2.0);
        assert_eq!(a.intersection_ratio(&far), 0.0);
    }
}
