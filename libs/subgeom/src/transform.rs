//! Translation of geometric objects.

use crate::{Point, Rect, Segment};

/// A trait for specifying how a shape is translated by a [`Point`].
pub trait Translate {
    /// Translates the shape by a [`Point`] through mutation.
    fn translate(&mut self, p: Point);
}

/// A trait for specifying how a shape is translated by a [`Point`].
pub trait TranslateOwned {
    /// Consumes and translates the shape by a [`Point`], returning the new shape.
    fn translate_owned(self, p: Point) -> Self
    where
        Self: Sized;
}

impl<T> TranslateOwned for T
where
    T: Translate,
{
    fn translate_owned(mut self, p: Point) -> Self {
        self.translate(p);
        self
    }
}

impl Translate for Point {
    fn translate(&mut self, p: Point) {
        self.x += p.x;
        self.y += p.y;
    }
}

impl Translate for Rect {
    fn translate(&mut self, p: Point) {
        self.p0.translate(p);
        self.p1.translate(p);
    }
}

impl Translate for Segment {
    fn translate(&mut self, p: Point) {
        self.p0.translate(p);
        self.p1.translate(p);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_rect() {
        let rect = Rect::from_bounds(0.0, 0.0, 40.0, 40.0).translate_owned(Point::new(40.0, -20.0));
        assert_eq!(rect, Rect::from_bounds(40.0, -20.0, 80.0, 20.0));
    }

    #[test]
    fn test_translate_segment() {
        let mut seg = Segment::new(Point::new(0.0, 20.0), Point::new(40.0, 20.0));
        seg.translate(Point::new(0.0, 40.0));
        assert_eq!(seg.p0, Point::new(0.0, 60.0));
        assert_eq!(seg.p1, Point::new(40.0, 60.0));
    }
}
