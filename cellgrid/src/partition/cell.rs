use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use subgeom::bbox::BoundBox;
use subgeom::{Point, Rect, Side};

use crate::deps::arcstr::ArcStr;
use crate::scene::{Element, ElementKey};

new_key_type! {
    /// A unique identifier for a [`Cell`].
    ///
    /// Keys stay valid across renames, but not across a full partition rebuild.
    pub struct CellKey;
}

/// The cell edge a virtual line lies on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeType {
    Lft,
    Rht,
    Btm,
    Top,
}

impl EdgeType {
    pub fn side(&self) -> Side {
        match self {
            Self::Lft => Side::Left,
            Self::Rht => Side::Right,
            Self::Btm => Side::Bot,
            Self::Top => Side::Top,
        }
    }
}

impl From<Side> for EdgeType {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => Self::Lft,
            Side::Right => Self::Rht,
            Side::Bot => Self::Btm,
            Side::Top => Self::Top,
        }
    }
}

impl Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Lft => "lft",
            Self::Rht => "rht",
            Self::Btm => "btm",
            Self::Top => "top",
        };
        write!(f, "{s}")
    }
}

/// A virtual line registered against one edge of a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VLineRegistration {
    pub name: ArcStr,
    pub relation: EdgeType,
    /// The constant coordinate of the line.
    pub value: f64,
}

/// Member geometry of a cell, grouped by layer for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerShape {
    Wire { p0: Point, p1: Point, width: i64 },
    Contact { center: Point, diameter: f64 },
}

/// Where a cell came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellOrigin {
    /// Derived from the column/row partition at the given 0-based indices.
    Grid { col: usize, row: usize },
    /// Injected through [`CellManager::add_cell`](super::CellManager::add_cell).
    ///
    /// Injected cells are exempt from the columns-by-rows invariant and are
    /// discarded by the next full rebuild.
    Injected,
}

/// A named rectangular region of the plane.
#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) id: CellKey,
    name: ArcStr,
    rect: Rect,
    origin: CellOrigin,
    elements: Vec<ElementKey>,
    virtual_lines: Vec<VLineRegistration>,
    layers: BTreeMap<ArcStr, Vec<LayerShape>>,
}

impl Cell {
    /// Creates a free-standing cell, to be injected with `add_cell`.
    pub fn new(name: impl Into<ArcStr>, rect: Rect) -> Self {
        Self {
            id: CellKey::default(),
            name: name.into(),
            rect,
            origin: CellOrigin::Injected,
            elements: Vec::new(),
            virtual_lines: Vec::new(),
            layers: BTreeMap::new(),
        }
    }

    pub(crate) fn grid(id: CellKey, col: usize, row: usize, rect: Rect) -> Self {
        Self {
            id,
            origin: CellOrigin::Grid { col, row },
            ..Self::new(grid_name(col, row), rect)
        }
    }

    #[inline]
    pub fn id(&self) -> CellKey {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn origin(&self) -> CellOrigin {
        self.origin
    }

    /// Closed containment test against the cell rectangle.
    #[inline]
    pub fn contains(&self, pt: Point) -> bool {
        self.rect.contains(pt)
    }

    /// Member elements, in scene creation order.
    #[inline]
    pub fn elements(&self) -> &[ElementKey] {
        &self.elements
    }

    #[inline]
    pub fn virtual_lines(&self) -> &[VLineRegistration] {
        &self.virtual_lines
    }

    #[inline]
    pub fn layers(&self) -> &BTreeMap<ArcStr, Vec<LayerShape>> {
        &self.layers
    }

    /// Writes the cell's rectangle and layer shapes as a CIF symbol.
    ///
    /// The symbol header carries the truncated corners of the cell. Each layer
    /// opens with `L {layer};` followed by its wires and contacts.
    pub fn to_cif(&self) -> String {
        let int = |p: Point| (p.x as i64, p.y as i64);
        let ((x1, y1), (x2, y2)) = (int(self.rect.p0), int(self.rect.p1));
        let mut lines = vec![format!("DS {x1} {y1} {x2} {y2};")];
        for (layer, shapes) in self.layers.iter() {
            lines.push(format!("L {layer};"));
            lines.extend(shapes.iter().map(|shape| match *shape {
                LayerShape::Wire { p0, p1, width } => {
                    let ((x1, y1), (x2, y2)) = (int(p0), int(p1));
                    format!("W {layer} {width} ({x1} {y1}) ({x2} {y2});")
                }
                LayerShape::Contact { center, diameter } => {
                    let (x, y) = int(center);
                    format!("C {layer} {diameter} ({x} {y});")
                }
            }));
        }
        lines.join("\n")
    }

    pub(crate) fn set_name(&mut self, name: ArcStr) {
        self.name = name;
    }

    pub(crate) fn clear_membership(&mut self) {
        self.elements.clear();
        self.layers.clear();
    }

    pub(crate) fn push_element(&mut self, key: ElementKey, element: &Element) {
        self.elements.push(key);
        let (material, shape) = match element {
            Element::Wire(w) => (
                w.material.clone(),
                LayerShape::Wire {
                    p0: w.p0,
                    p1: w.p1,
                    width: w.width,
                },
            ),
            Element::Contact(c) => (
                c.material.clone(),
                LayerShape::Contact {
                    center: c.center,
                    diameter: c.size,
                },
            ),
            Element::Transistor(_) => return,
        };
        self.layers.entry(material).or_default().push(shape);
    }

    pub(crate) fn purge_vline(&mut self, name: &str) -> usize {
        let before = self.virtual_lines.len();
        self.virtual_lines.retain(|vl| vl.name != name);
        before - self.virtual_lines.len()
    }

    pub(crate) fn register_vline(&mut self, record: VLineRegistration) {
        self.virtual_lines.push(record);
    }

    pub(crate) fn clear_virtual_lines(&mut self) {
        self.virtual_lines.clear();
    }
}

impl BoundBox for Cell {
    fn bbox(&self) -> subgeom::bbox::Bbox {
        self.rect.bbox()
    }
}

/// The display name of the grid cell at the given 0-based column and row.
///
/// Indices are concatenated without a separator, so `cell111` may be column 1
/// row 11 or column 11 row 1.
pub fn grid_name(col: usize, row: usize) -> ArcStr {
    arcstr::format!("cell{}{}", col + 1, row + 1)
}
