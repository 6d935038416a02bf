//! Core geometric types and their operations/attributes.
//!
//! All coordinates are `f64` plane units. Comparisons that must tolerate
//! floating-point noise take an explicit epsilon.

use std::fmt::Display;
use std::str::FromStr;

use array_map::{ArrayMap, Indexable};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use transform::TranslateOwned;

use self::bbox::Bbox;

pub mod bbox;
pub mod transform;

/// Snaps `pos` to the nearest multiple of `grid`.
///
/// Values exactly halfway between two grid points round away from zero.
///
/// # Panics
///
/// Panics if `grid` is not positive.
pub fn snap_to_grid(pos: f64, grid: f64) -> f64 {
    assert!(grid > 0.0);
    (pos / grid).round() * grid
}

/// Returns `true` if `a` and `b` differ by strictly less than `eps`.
#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

/// A point in two-dimensional layout-space.
#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, PartialOrd)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new [`Point`] from (x,y) coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the origin, (0, 0).
    #[inline]
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Creates a new [`Point`] that serves as an offset in direction `dir`.
    pub fn offset(val: f64, dir: Dir) -> Self {
        match dir {
            Dir::Horiz => Self { x: val, y: 0.0 },
            Dir::Vert => Self { x: 0.0, y: val },
        }
    }

    /// Gets the coordinate associated with direction `dir`.
    pub fn coord(&self, dir: Dir) -> f64 {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }

    /// Returns a mutable reference to the coordinate associated with direction `dir`.
    pub fn coord_mut(&mut self, dir: Dir) -> &mut f64 {
        match dir {
            Dir::Horiz => &mut self.x,
            Dir::Vert => &mut self.y,
        }
    }

    /// Creates a new [`Point`] shifted by `p.x` in the x-dimension and by `p.y` in the y-dimension.
    #[inline]
    pub fn translated(&self, p: Point) -> Self {
        self.translate_owned(p)
    }

    /// Returns `true` if both coordinates lie within `eps` of `other`'s.
    pub fn approx_eq(&self, other: &Point, eps: f64) -> bool {
        approx_eq(self.x, other.x, eps) && approx_eq(self.y, other.y, eps)
    }

    #[inline]
    pub fn snap_to_grid(&self, grid: f64) -> Self {
        Self::new(snap_to_grid(self.x, grid), snap_to_grid(self.y, grid))
    }
}

impl std::ops::Add<Point> for Point {
    type Output = Self;
    fn add(self, rhs: Point) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign<Point> for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub<Point> for Point {
    type Output = Self;
    fn sub(self, rhs: Point) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Neg for Point {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from(value: (f64, f64)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

/// A one-dimensional closed interval.
#[derive(Debug, Default, Clone, Copy, PartialOrd, Serialize, Deserialize, PartialEq)]
pub struct Span {
    start: f64,
    stop: f64,
}

impl Span {
    /// Creates a new [`Span`] between two coordinates, in either order.
    pub fn new(start: f64, stop: f64) -> Self {
        Self {
            start: start.min(stop),
            stop: start.max(stop),
        }
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn center(&self) -> f64 {
        (self.start + self.stop) / 2.0
    }

    pub fn length(&self) -> f64 {
        self.stop - self.start
    }

    /// Returns `true` if `x` lies within the span, endpoints included.
    pub fn contains_point(&self, x: f64) -> bool {
        self.start <= x && x <= self.stop
    }

    /// Returns `true` if the spans share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        !(other.stop < self.start || self.stop < other.start)
    }

    /// Returns `true` if both endpoints lie within `eps` of `other`'s.
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        approx_eq(self.start, other.start, eps) && approx_eq(self.stop, other.stop, eps)
    }

    /// Returns the smallest span containing both spans.
    pub fn union(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            stop: self.stop.max(other.stop),
        }
    }

    /// Shifts the span by `amount`.
    pub fn translate(self, amount: f64) -> Self {
        Self {
            start: self.start + amount,
            stop: self.stop + amount,
        }
    }
}

impl From<(f64, f64)> for Span {
    fn from(tup: (f64, f64)) -> Self {
        Self::new(tup.0, tup.1)
    }
}

/// Enumeration over possible directions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum Dir {
    /// Horizontal.
    Horiz,
    /// Vertical.
    Vert,
}

#[derive(Debug, Clone, Error)]
#[error("error parsing direction: {0:?}")]
pub struct DirParseError(String);

impl FromStr for Dir {
    type Err = DirParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "h" | "horiz" | "horizontal" | "x" => Ok(Dir::Horiz),
            "v" | "vert" | "vertical" | "y" => Ok(Dir::Vert),
            _ => Err(DirParseError(s.to_string())),
        }
    }
}

impl Dir {
    /// Returns the other direction.
    pub fn other(self) -> Self {
        match self {
            Self::Horiz => Self::Vert,
            Self::Vert => Self::Horiz,
        }
    }
}

impl Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Horiz => write!(f, "horizontal"),
            Self::Vert => write!(f, "vertical"),
        }
    }
}

impl std::ops::Not for Dir {
    type Output = Self;
    fn not(self) -> Self::Output {
        self.other()
    }
}

/// An enumeration of the sides of a axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[repr(u8)]
#[derive(Indexable)]
pub enum Side {
    Left,
    Right,
    Bot,
    Top,
}

impl Side {
    /// All four sides, in the order edge-touch tests visit them.
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Bot, Side::Top];

    /// Gets the direction of the coordinate corresponding to this side.
    ///
    /// Left and right edges are x-coordinates, so they are on the **horizontal** axis.
    pub fn coord_dir(&self) -> Dir {
        match self {
            Side::Top | Side::Bot => Dir::Vert,
            Side::Left | Side::Right => Dir::Horiz,
        }
    }

    /// Gets the direction of the edge corresponding to this side.
    ///
    /// Left and right edges are **vertical** line segments.
    pub fn edge_dir(&self) -> Dir {
        self.coord_dir().other()
    }

    /// Returns the opposite side.
    pub fn other(&self) -> Self {
        match self {
            Side::Top => Side::Bot,
            Side::Right => Side::Left,
            Side::Bot => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// Returns the sides that bound the given direction, lower side first.
    pub fn with_dir(dir: Dir) -> [Side; 2] {
        match dir {
            Dir::Horiz => [Side::Left, Side::Right],
            Dir::Vert => [Side::Bot, Side::Top],
        }
    }
}

impl std::ops::Not for Side {
    type Output = Self;
    fn not(self) -> Self::Output {
        self.other()
    }
}

/// An association of a value with type `T` to each of the four [`Side`]s.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Sides<T> {
    inner: ArrayMap<Side, T, 4>,
}

impl<T> Sides<T> {
    /// Creates a new [`Sides`] with with the provided values for each side.
    pub const fn new(left: T, right: T, bot: T, top: T) -> Self {
        // Array order must match the variant order of [`Side`].
        Self {
            inner: ArrayMap::new([left, right, bot, top]),
        }
    }

    /// Maps a function over the provided [`Sides`], returning a new [`Sides`].
    pub fn map<B>(self, f: impl FnMut(&Side, T) -> B) -> Sides<B> {
        Sides {
            inner: self.inner.map(f),
        }
    }

    /// Iterates over `(side, value)` pairs in [`Side::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> + '_ {
        Side::ALL.into_iter().map(move |side| (side, &self[side]))
    }
}

impl<T> std::ops::Index<Side> for Sides<T> {
    type Output = T;
    fn index(&self, index: Side) -> &Self::Output {
        self.inner.index(index)
    }
}

impl<T> std::ops::IndexMut<Side> for Sides<T> {
    fn index_mut(&mut self, index: Side) -> &mut Self::Output {
        self.inner.index_mut(index)
    }
}

/// An edge of a rectangle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    /// The side of the rectangle this edge corresponds to.
    side: Side,
    /// The coordinate of the edge.
    coord: f64,
    /// The perpendicular span of the edge.
    span: Span,
}

impl Edge {
    /// Create a new edge.
    ///
    /// # Example
    ///
    /// ```
    /// # use subgeom::*;
    /// let edge = Edge::new(Side::Left, 20., Span::new(40., 100.));
    /// assert_eq!(edge.coord(), 20.);
    /// ```
    pub fn new(side: Side, coord: f64, span: Span) -> Self {
        Self { side, coord, span }
    }

    /// The side (of a rectangle) to which this edge corresponds.
    pub fn side(&self) -> Side {
        self.side
    }

    /// The coordinate of the edge.
    ///
    /// For left/right edges, this will be the x coordinate of the edge.
    /// For top/bottom edges, this will be the y coordinate of the edge.
    pub fn coord(&self) -> f64 {
        self.coord
    }

    /// The span of the edge.
    ///
    /// For left/right edges, this will be the range of y-coordinates encompassed by the edge.
    /// For top/bottom edges, this will be the range of x-coordinates encompassed by the edge.
    pub fn span(&self) -> Span {
        self.span
    }

    /// The direction parallel to the edge.
    ///
    /// # Example
    ///
    /// ```
    /// # use subgeom::*;
    /// let edge = Edge::new(Side::Left, 20., Span::new(40., 100.));
    /// assert_eq!(edge.edge_dir(), Dir::Vert);
    /// let edge = Edge::new(Side::Top, 20., Span::new(40., 100.));
    /// assert_eq!(edge.edge_dir(), Dir::Horiz);
    /// ```
    pub fn edge_dir(&self) -> Dir {
        self.side.edge_dir()
    }

    /// Returns `true` if `pt` lies within `eps` of the edge's coordinate and
    /// within its closed span.
    ///
    /// # Example
    ///
    /// ```
    /// # use subgeom::*;
    /// let edge = Edge::new(Side::Right, 40., Span::new(0., 40.));
    /// assert!(edge.touches(Point::new(41., 20.), 2.));
    /// assert!(!edge.touches(Point::new(40., 41.), 2.));
    /// ```
    pub fn touches(&self, pt: Point, eps: f64) -> bool {
        let dir = self.side.coord_dir();
        approx_eq(pt.coord(dir), self.coord, eps) && self.span.contains_point(pt.coord(!dir))
    }

    /// Converts the edge into the segment it covers, running from the low
    /// end of its span to the high end.
    pub fn to_segment(&self) -> Segment {
        let dir = self.side.coord_dir();
        let mut p0 = Point::zero();
        let mut p1 = Point::zero();
        *p0.coord_mut(dir) = self.coord;
        *p1.coord_mut(dir) = self.coord;
        *p0.coord_mut(!dir) = self.span.start();
        *p1.coord_mut(!dir) = self.span.stop();
        Segment::new(p0, p1)
    }
}

/// Axis classification of a [`Segment`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum Orientation {
    /// Constant y.
    Horizontal,
    /// Constant x.
    Vertical,
    /// Neither coordinate is constant.
    Diagonal,
}

/// A straight line segment between two points.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub p0: Point,
    pub p1: Point,
}

impl Segment {
    pub fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }

    /// Classifies the segment, treating coordinates within `eps` as equal.
    ///
    /// A degenerate segment (a single point) classifies as vertical.
    ///
    /// # Example
    ///
    /// ```
    /// # use subgeom::*;
    /// let seg = Segment::new(Point::new(40., 0.), Point::new(40.05, 40.));
    /// assert_eq!(seg.classify(0.1), Orientation::Vertical);
    /// let seg = Segment::new(Point::new(0., 0.), Point::new(40., 40.));
    /// assert_eq!(seg.classify(0.1), Orientation::Diagonal);
    /// ```
    pub fn classify(&self, eps: f64) -> Orientation {
        if approx_eq(self.p0.x, self.p1.x, eps) {
            Orientation::Vertical
        } else if approx_eq(self.p0.y, self.p1.y, eps) {
            Orientation::Horizontal
        } else {
            Orientation::Diagonal
        }
    }

    /// The extent of the segment along direction `dir`.
    pub fn span(&self, dir: Dir) -> Span {
        Span::new(self.p0.coord(dir), self.p1.coord(dir))
    }

    /// Returns the segment with its endpoints swapped.
    pub fn reversed(&self) -> Self {
        Self::new(self.p1, self.p0)
    }

    /// Returns `true` if both segments join the same pair of points within `eps`,
    /// in either order.
    pub fn coincides(&self, other: &Segment, eps: f64) -> bool {
        let same = self.p0.approx_eq(&other.p0, eps) && self.p1.approx_eq(&other.p1, eps);
        let reversed = self.p0.approx_eq(&other.p1, eps) && self.p1.approx_eq(&other.p0, eps);
        same || reversed
    }
}

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub p0: Point,
    pub p1: Point,
}

impl Rect {
    /// Creates a rectangle from two opposite corners, in any order.
    pub fn new(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }

    /// Creates a rectangle from `(x1, y1, x2, y2)` bounds.
    pub fn from_bounds(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.p0.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.p1.x
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.p0.y
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.p1.y
    }

    pub fn hspan(&self) -> Span {
        Span::new(self.p0.x, self.p1.x)
    }

    pub fn vspan(&self) -> Span {
        Span::new(self.p0.y, self.p1.y)
    }

    /// Gets the span of the rectangle along direction `dir`.
    pub fn span(&self, dir: Dir) -> Span {
        match dir {
            Dir::Horiz => self.hspan(),
            Dir::Vert => self.vspan(),
        }
    }

    pub fn width(&self) -> f64 {
        self.p1.x - self.p0.x
    }

    pub fn height(&self) -> f64 {
        self.p1.y - self.p0.y
    }

    /// The length of the rectangle along direction `dir`.
    pub fn length(&self, dir: Dir) -> f64 {
        self.span(dir).length()
    }

    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2.0, (self.p0.y + self.p1.y) / 2.0)
    }

    /// Returns `true` if the rectangle contains `pt`, boundary included.
    pub fn contains(&self, pt: Point) -> bool {
        self.p0.x <= pt.x && pt.x <= self.p1.x && self.p0.y <= pt.y && pt.y <= self.p1.y
    }

    /// Gets the coordinate associated with a given side of the rectangle.
    pub fn side(&self, side: Side) -> f64 {
        match side {
            Side::Top => self.top(),
            Side::Bot => self.bottom(),
            Side::Right => self.right(),
            Side::Left => self.left(),
        }
    }

    /// Gets the edge associated with the given side of the rectangle.
    ///
    /// # Example
    ///
    /// ```
    /// # use subgeom::*;
    /// let rect = Rect::from_bounds(0., 0., 40., 80.);
    /// assert_eq!(rect.edge(Side::Right), Edge::new(Side::Right, 40., Span::new(0., 80.)));
    /// ```
    pub fn edge(&self, side: Side) -> Edge {
        Edge::new(side, self.side(side), self.span(side.edge_dir()))
    }

    /// All four edges of the rectangle.
    pub fn edges(&self) -> Sides<Edge> {
        Sides::new(
            self.edge(Side::Left),
            self.edge(Side::Right),
            self.edge(Side::Bot),
            self.edge(Side::Top),
        )
    }

    /// Returns a new rectangle grown by `amount` on every side.
    pub fn expand(&self, amount: f64) -> Self {
        Self::new(
            Point::new(self.p0.x - amount, self.p0.y - amount),
            Point::new(self.p1.x + amount, self.p1.y + amount),
        )
    }

    /// Returns `true` if every bound lies within `eps` of `other`'s.
    pub fn approx_eq(&self, other: &Rect, eps: f64) -> bool {
        self.p0.approx_eq(&other.p0, eps) && self.p1.approx_eq(&other.p1, eps)
    }
}

impl From<Bbox> for Rect {
    fn from(b: Bbox) -> Self {
        debug_assert!(!b.is_empty());
        Self { p0: b.p0, p1: b.p1 }
    }
}
