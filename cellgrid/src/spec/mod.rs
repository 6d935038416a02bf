//! The `LAYOUT()` fragment text format.
//!
//! A fragment describes one cell: its name, the virtual lines bounding it,
//! and the transistors, contacts and wires drawn inside. Coordinates are
//! written in logical steps relative to the cell's lower-left corner.
//!
//! ```text
//! layout& cell11_::LAYOUT()
//! {
//! FRAG(cell11)
//! VLIN_X("cell11left", 0.00);
//! VLIN_X("cell11right", 1.00);
//! VLIN_Y("cell11bot", 0.00);
//! VLIN_Y("cell11top", 2.00);
//! W(1.00) L(1.00) OR(NORTH) TP(0.50, 0.00);
//! OR(NORTH) CPA(0.50, 1.50);
//! WIRE(M2, -3, 0.00, 1.50, 1.00, 1.50);
//! ENDF
//! return cell11;
//! }
//! ```

use std::num::{ParseFloatError, ParseIntError};

use subgeom::transform::{Translate, TranslateOwned};
use subgeom::{Dir, Point, Rect, Segment};
use thiserror::Error;

use crate::deps::arcstr::ArcStr;
use crate::scene::{Element, KeywordParseError};

pub mod export;
mod parse;

pub use export::export_layout;

/// Errors produced while reading fragment text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no cell name found (expected `FRAG(name)` or `layout& name_::LAYOUT`)")]
    MissingName,
    #[error("cell {cell} is missing boundary lines: {}", missing.join(", "))]
    MissingBoundary { cell: ArcStr, missing: Vec<String> },
    #[error("cell {0} has an empty boundary")]
    EmptyBounds(ArcStr),
    #[error("invalid number: {0}")]
    Float(#[from] ParseFloatError),
    #[error("invalid integer: {0}")]
    Int(#[from] ParseIntError),
    #[error(transparent)]
    Keyword(#[from] KeywordParseError),
}

/// A virtual line declared with `VLIN_X` or `VLIN_Y`.
#[derive(Debug, Clone, PartialEq)]
pub struct VLineDecl {
    pub name: ArcStr,
    /// The axis `value` is measured along: [`Dir::Horiz`] for `VLIN_X`,
    /// which declares a vertical line.
    pub axis: Dir,
    /// Position in plane units.
    pub value: f64,
}

impl VLineDecl {
    /// The line drawn across `bounds` at this declaration's position.
    pub fn segment(&self, bounds: &Rect) -> Segment {
        match self.axis {
            Dir::Horiz => Segment::new(
                Point::new(self.value, bounds.bottom()),
                Point::new(self.value, bounds.top()),
            ),
            Dir::Vert => Segment::new(
                Point::new(bounds.left(), self.value),
                Point::new(bounds.right(), self.value),
            ),
        }
    }
}

/// A parsed fragment, in plane units.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSpec {
    pub name: ArcStr,
    pub bounds: Rect,
    pub vlines: Vec<VLineDecl>,
    /// Wires, then contacts, then transistors, each in text order.
    pub elements: Vec<Element>,
}

impl CellSpec {
    /// Moves the whole fragment so that its origin lands on `origin`.
    pub fn translated(self, origin: Point) -> Self {
        let Self {
            name,
            bounds,
            vlines,
            elements,
        } = self;
        Self {
            name,
            bounds: bounds.translate_owned(origin),
            vlines: vlines
                .into_iter()
                .map(|decl| VLineDecl {
                    value: decl.value + origin.coord(decl.axis),
                    ..decl
                })
                .collect(),
            elements: elements
                .into_iter()
                .map(|mut element| {
                    element.translate(origin);
                    element
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Contact, ElementTrait};

    #[test]
    fn test_vline_decl_segment() {
        let bounds = Rect::from_bounds(0.0, 0.0, 40.0, 80.0);
        let x = VLineDecl {
            name: "cell11left".into(),
            axis: Dir::Horiz,
            value: 0.0,
        };
        assert_eq!(
            x.segment(&bounds),
            Segment::new(Point::new(0.0, 0.0), Point::new(0.0, 80.0))
        );
        let y = VLineDecl {
            name: "cell11top".into(),
            axis: Dir::Vert,
            value: 80.0,
        };
        assert_eq!(
            y.segment(&bounds),
            Segment::new(Point::new(0.0, 80.0), Point::new(40.0, 80.0))
        );
    }

    #[test]
    fn test_translated() {
        let spec = CellSpec {
            name: "cell11".into(),
            bounds: Rect::from_bounds(0.0, 0.0, 40.0, 40.0),
            vlines: vec![VLineDecl {
                name: "cell11right".into(),
                axis: Dir::Horiz,
                value: 40.0,
            }],
            elements: vec![Contact::new("CPA", 10.0, Point::new(20.0, 20.0)).into()],
        }
        .translated(Point::new(80.0, 40.0));

        assert_eq!(spec.bounds, Rect::from_bounds(80.0, 40.0, 120.0, 80.0));
        assert_eq!(spec.vlines[0].value, 120.0);
        assert_eq!(spec.elements[0].anchor_points(), vec![Point::new(100.0, 60.0)]);
    }
}
