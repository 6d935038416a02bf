//! Placed layout primitives.

use std::fmt::Display;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use subgeom::bbox::{Bbox, BoundBox};
use subgeom::transform::Translate;
use subgeom::{Dir, Point, Rect, Segment};
use thiserror::Error;

use crate::deps::arcstr::ArcStr;

/// The kind tag of an [`Element`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum ElementKind {
    Wire,
    Contact,
    Transistor,
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wire => write!(f, "wire"),
            Self::Contact => write!(f, "contact"),
            Self::Transistor => write!(f, "transistor"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {what}: {value:?}")]
pub struct KeywordParseError {
    what: &'static str,
    value: String,
}

/// Transistor polarity.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum TransistorKind {
    #[default]
    Tp,
    Tn,
}

impl Display for TransistorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tp => write!(f, "TP"),
            Self::Tn => write!(f, "TN"),
        }
    }
}

impl FromStr for TransistorKind {
    type Err = KeywordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TP" => Ok(Self::Tp),
            "TN" => Ok(Self::Tn),
            _ => Err(KeywordParseError {
                what: "transistor kind",
                value: s.to_string(),
            }),
        }
    }
}

/// One of the four cardinal directions.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum Direction {
    #[default]
    North,
    South,
    East,
    West,
}

impl Direction {
    /// The axis along which this direction points.
    pub fn dir(&self) -> Dir {
        match self {
            Self::North | Self::South => Dir::Vert,
            Self::East | Self::West => Dir::Horiz,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::North => "NORTH",
            Self::South => "SOUTH",
            Self::East => "EAST",
            Self::West => "WEST",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Direction {
    type Err = KeywordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NORTH" => Ok(Self::North),
            "SOUTH" => Ok(Self::South),
            "EAST" => Ok(Self::East),
            "WEST" => Ok(Self::West),
            _ => Err(KeywordParseError {
                what: "direction",
                value: s.to_string(),
            }),
        }
    }
}

/// A straight, axis-aligned wire on a conductor layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub material: ArcStr,
    /// Logical width, as written in specification text.
    pub width: i64,
    pub p0: Point,
    pub p1: Point,
}

impl Wire {
    pub fn new(material: impl Into<ArcStr>, width: i64, p0: Point, p1: Point) -> Self {
        Self {
            material: material.into(),
            width,
            p0,
            p1,
        }
    }

    #[inline]
    pub fn segment(&self) -> Segment {
        Segment::new(self.p0, self.p1)
    }
}

/// A contact cut, drawn as a circle around `center`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub material: ArcStr,
    /// Diameter.
    pub size: f64,
    pub center: Point,
}

impl Contact {
    pub fn new(material: impl Into<ArcStr>, size: f64, center: Point) -> Self {
        Self {
            material: material.into(),
            size,
            center,
        }
    }
}

/// A transistor symbol: a square body with a gate line projecting from one side.
///
/// `loc` is the bottom-centre of the body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transistor {
    pub kind: TransistorKind,
    pub direction: Direction,
    pub loc: Point,
    pub width: f64,
    pub line_length: f64,
    /// Side length of the body square.
    pub body_size: f64,
}

impl Transistor {
    pub fn body(&self) -> Rect {
        let half = self.body_size / 2.0;
        Rect::from_bounds(
            self.loc.x - half,
            self.loc.y,
            self.loc.x + half,
            self.loc.y + self.body_size,
        )
    }

    /// The gate line, starting on the body side that faces `direction`.
    pub fn gate(&self) -> Segment {
        let body = self.body();
        let c = body.center();
        let len = self.line_length;
        let (start, end) = match self.direction {
            Direction::North => (
                Point::new(c.x, body.top()),
                Point::new(c.x, body.top() + len),
            ),
            Direction::South => (
                Point::new(c.x, body.bottom()),
                Point::new(c.x, body.bottom() - len),
            ),
            Direction::East => (
                Point::new(body.right(), c.y),
                Point::new(body.right() + len, c.y),
            ),
            Direction::West => (
                Point::new(body.left(), c.y),
                Point::new(body.left() - len, c.y),
            ),
        };
        Segment::new(start, end)
    }
}

/// Attributes common to every placed element, dispatched by [mod@enum_dispatch].
#[enum_dispatch]
pub trait ElementTrait {
    fn kind(&self) -> ElementKind;
    /// The layer or material label; transistors report their polarity.
    fn material(&self) -> ArcStr;
    /// Points that determine which cells the element belongs to.
    fn anchor_points(&self) -> Vec<Point>;
}

impl ElementTrait for Wire {
    fn kind(&self) -> ElementKind {
        ElementKind::Wire
    }
    fn material(&self) -> ArcStr {
        self.material.clone()
    }
    fn anchor_points(&self) -> Vec<Point> {
        vec![self.p0, self.p1]
    }
}

impl ElementTrait for Contact {
    fn kind(&self) -> ElementKind {
        ElementKind::Contact
    }
    fn material(&self) -> ArcStr {
        self.material.clone()
    }
    fn anchor_points(&self) -> Vec<Point> {
        vec![self.center]
    }
}

impl ElementTrait for Transistor {
    fn kind(&self) -> ElementKind {
        ElementKind::Transistor
    }
    fn material(&self) -> ArcStr {
        match self.kind {
            TransistorKind::Tp => arcstr::literal!("TP"),
            TransistorKind::Tn => arcstr::literal!("TN"),
        }
    }
    fn anchor_points(&self) -> Vec<Point> {
        vec![self.bbox().center()]
    }
}

/// A placed element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[enum_dispatch(ElementTrait)]
pub enum Element {
    Wire(Wire),
    Contact(Contact),
    Transistor(Transistor),
}

impl Element {
    pub fn as_wire(&self) -> Option<&Wire> {
        match self {
            Self::Wire(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_contact(&self) -> Option<&Contact> {
        match self {
            Self::Contact(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_transistor(&self) -> Option<&Transistor> {
        match self {
            Self::Transistor(t) => Some(t),
            _ => None,
        }
    }

    /// Returns `true` if any anchor point lies inside `rect` (closed containment).
    pub fn is_anchored_in(&self, rect: &Rect) -> bool {
        self.anchor_points().into_iter().any(|pt| rect.contains(pt))
    }

    /// Moves every anchor whose coordinate along `dir` exceeds `threshold` by
    /// `amount` along `dir`.
    ///
    /// Wire endpoints move independently, stretching wires that straddle the
    /// threshold. Contacts and transistors move as a whole.
    pub fn shift_beyond(&mut self, dir: Dir, threshold: f64, amount: f64) {
        let offset = Point::offset(amount, dir);
        match self {
            Self::Wire(w) => {
                for pt in [&mut w.p0, &mut w.p1] {
                    if pt.coord(dir) > threshold {
                        pt.translate(offset);
                    }
                }
            }
            Self::Contact(c) => {
                if c.center.coord(dir) > threshold {
                    c.center.translate(offset);
                }
            }
            Self::Transistor(t) => {
                if t.loc.coord(dir) > threshold {
                    t.loc.translate(offset);
                }
            }
        }
    }
}

impl BoundBox for Wire {
    fn bbox(&self) -> Bbox {
        self.segment().bbox()
    }
}

impl BoundBox for Contact {
    fn bbox(&self) -> Bbox {
        let r = self.size / 2.0;
        Bbox::new(
            Point::new(self.center.x - r, self.center.y - r),
            Point::new(self.center.x + r, self.center.y + r),
        )
    }
}

impl BoundBox for Transistor {
    fn bbox(&self) -> Bbox {
        self.body().bbox().union(self.gate().bbox())
    }
}

impl BoundBox for Element {
    fn bbox(&self) -> Bbox {
        match self {
            Self::Wire(w) => w.bbox(),
            Self::Contact(c) => c.bbox(),
            Self::Transistor(t) => t.bbox(),
        }
    }
}

impl Translate for Wire {
    fn translate(&mut self, p: Point) {
        self.p0.translate(p);
        self.p1.translate(p);
    }
}

impl Translate for Contact {
    fn translate(&mut self, p: Point) {
        self.center.translate(p);
    }
}

impl Translate for Transistor {
    fn translate(&mut self, p: Point) {
        self.loc.translate(p);
    }
}

impl Translate for Element {
    fn translate(&mut self, p: Point) {
        match self {
            Self::Wire(w) => w.translate(p),
            Self::Contact(c) => c.translate(p),
            Self::Transistor(t) => t.translate(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use subgeom::transform::TranslateOwned;

    use super::*;

    fn transistor(direction: Direction) -> Transistor {
        Transistor {
            kind: TransistorKind::Tn,
            direction,
            loc: Point::new(20.0, 0.0),
            width: 1.0,
            line_length: 40.0,
            body_size: 40.0,
        }
    }

    #[test]
    fn test_transistor_geometry() {
        let t = transistor(Direction::North);
        assert_eq!(t.body(), Rect::from_bounds(0.0, 0.0, 40.0, 40.0));
        assert_eq!(
            t.gate(),
            Segment::new(Point::new(20.0, 40.0), Point::new(20.0, 80.0))
        );
        assert_eq!(t.bbox().into_rect(), Rect::from_bounds(0.0, 0.0, 40.0, 80.0));
        assert_eq!(t.anchor_points(), vec![Point::new(20.0, 40.0)]);

        let t = transistor(Direction::West);
        assert_eq!(t.bbox().into_rect(), Rect::from_bounds(-40.0, 0.0, 40.0, 40.0));
        assert_eq!(t.material(), "TN");
    }

    #[test]
    fn test_shift_beyond_stretches_straddling_wire() {
        let mut wire = Element::Wire(Wire::new(
            "M2",
            -3,
            Point::new(20.0, 20.0),
            Point::new(100.0, 20.0),
        ));
        wire.shift_beyond(Dir::Horiz, 80.0, 40.0);
        let wire = wire.as_wire().unwrap();
        assert_eq!(wire.p0, Point::new(20.0, 20.0));
        assert_eq!(wire.p1, Point::new(140.0, 20.0));
    }

    #[test]
    fn test_translate_element() {
        let contact = Element::Contact(Contact::new("CPA", 10.0, Point::new(20.0, 20.0)))
            .translate_owned(Point::new(40.0, 0.0));
        assert_eq!(contact.anchor_points(), vec![Point::new(60.0, 20.0)]);
        assert_eq!(contact.kind(), ElementKind::Contact);
    }

    #[test]
    fn test_keywords() {
        assert_eq!("EAST".parse::<Direction>().unwrap(), Direction::East);
        assert_eq!(Direction::South.to_string(), "SOUTH");
        assert_eq!("TN".parse::<TransistorKind>().unwrap(), TransistorKind::Tn);
        assert!("TX".parse::<TransistorKind>().is_err());
    }
}
