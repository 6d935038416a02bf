//! Buffers: named groups of cells sharing one column or row interval.
//!
//! Column buffer `i` spans `[columns[i], columns[i + 1]]` and links every cell
//! whose x-range equals that interval exactly. Row buffers are the same along y.
//! Buffers are drawn in an auxiliary strip below (columns) or to the left of
//! (rows) the origin so that they never cover real geometry.

use std::collections::HashMap;
use std::fmt::{Display, Write};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use subgeom::{approx_eq, Dir, Rect, Span};

use crate::config::EditorConfig;
use crate::deps::arcstr::{self, ArcStr};
use crate::error::{ErrorSource, Result};
use crate::log::debug;
use crate::partition::{CellKey, CellManager, LayerShape};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
pub enum BufferKind {
    Column,
    Row,
}

impl BufferKind {
    /// The axis along which buffers of this kind are measured.
    pub fn dir(&self) -> Dir {
        match self {
            Self::Column => Dir::Horiz,
            Self::Row => Dir::Vert,
        }
    }
}

impl Display for BufferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Column => write!(f, "column"),
            Self::Row => write!(f, "row"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellBuffer {
    /// Where the buffer is drawn, inside the auxiliary strip.
    pub rect: Rect,
    pub text: ArcStr,
    pub kind: BufferKind,
    /// 0-based position of the interval in the sorted coordinate list.
    pub index: usize,
    /// The interval this buffer covers along `kind.dir()`.
    pub span: Span,
    pub linked_cells: Vec<CellKey>,
}

impl CellBuffer {
    /// Width of a column buffer, height of a row buffer.
    #[inline]
    pub fn extent(&self) -> f64 {
        self.span.length()
    }

    /// Writes the buffer's linked cells as one CIF symbol definition.
    ///
    /// Each linked cell becomes a `L Cell_{n};` section listing the wires and
    /// contacts gathered during element assignment. Coordinates are truncated
    /// to integers.
    pub fn to_cif(&self, fragment_id: u32, cells: &CellManager) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "DS {fragment_id} 1 1;");
        let _ = writeln!(out, "9 {};", self.text.replace(' ', "_"));
        for (i, cell) in self
            .linked_cells
            .iter()
            .filter_map(|key| cells.cell(*key))
            .enumerate()
        {
            let _ = writeln!(out, "L Cell_{};", i + 1);
            for (layer, shapes) in cell.layers() {
                for shape in shapes {
                    let _ = match shape {
                        LayerShape::Wire { p0, p1, width } => writeln!(
                            out,
                            "W {} {} {} {} {};",
                            width, p0.x as i64, p0.y as i64, p1.x as i64, p1.y as i64
                        ),
                        LayerShape::Contact { center, .. } => writeln!(
                            out,
                            "C {} T {} {};",
                            layer, center.x as i64, center.y as i64
                        ),
                    };
                }
            }
        }
        out.push_str("DF;");
        out
    }
}

#[derive(Debug)]
pub struct BufferManager {
    buffers: Vec<CellBuffer>,
    /// User-assigned names, surviving rebuilds.
    names: HashMap<(BufferKind, usize), ArcStr>,
    strip: f64,
    eps: f64,
}

impl Default for BufferManager {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl BufferManager {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            buffers: Vec::new(),
            names: HashMap::new(),
            strip: config.buffer_strip,
            eps: config.boundary_tolerance,
        }
    }

    /// Discards every buffer and derives a fresh set from the given coordinates.
    ///
    /// One column buffer is created per adjacent pair of columns, then one row
    /// buffer per adjacent pair of rows. Each buffer links the current cells
    /// whose range along the buffer's axis equals its interval.
    pub fn update_comments(&mut self, columns: &[f64], rows: &[f64], cells: &CellManager) {
        self.buffers.clear();
        for (kind, coords) in [(BufferKind::Column, columns), (BufferKind::Row, rows)] {
            let sorted = coords.iter().copied().sorted_by(f64::total_cmp);
            for (index, (lo, hi)) in sorted.tuple_windows().enumerate() {
                let span = Span::new(lo, hi);
                let rect = match kind {
                    BufferKind::Column => Rect::from_bounds(lo, -self.strip, hi, 0.0),
                    BufferKind::Row => Rect::from_bounds(-self.strip, lo, 0.0, hi),
                };
                let text = self.names.get(&(kind, index)).cloned().unwrap_or_else(|| {
                    match kind {
                        BufferKind::Column => arcstr::format!("Column buffer {}", index + 1),
                        BufferKind::Row => arcstr::format!("Row buffer {}", index + 1),
                    }
                });
                let linked_cells = cells
                    .cells()
                    .filter(|cell| {
                        let range = cell.rect().span(kind.dir());
                        approx_eq(range.start(), span.start(), self.eps)
                            && approx_eq(range.stop(), span.stop(), self.eps)
                    })
                    .map(|cell| cell.id())
                    .collect();
                self.buffers.push(CellBuffer {
                    rect,
                    text,
                    kind,
                    index,
                    span,
                    linked_cells,
                });
            }
        }
        debug!("derived {} buffers", self.buffers.len());
    }

    pub fn buffers(&self) -> &[CellBuffer] {
        &self.buffers
    }

    pub fn buffer(&self, kind: BufferKind, index: usize) -> Option<&CellBuffer> {
        self.buffers
            .iter()
            .find(|b| b.kind == kind && b.index == index)
    }

    /// Renames a buffer. The name is kept for the buffer at this position
    /// across later rebuilds.
    pub fn rename(&mut self, kind: BufferKind, index: usize, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ErrorSource::InvalidArgs("buffer name must not be empty".into()).into());
        }
        let buffer = self
            .buffers
            .iter_mut()
            .find(|b| b.kind == kind && b.index == index)
            .ok_or(ErrorSource::BufferNotFound { kind, index })?;
        let text = ArcStr::from(text);
        buffer.text = text.clone();
        self.names.insert((kind, index), text);
        Ok(())
    }
}

/// The largest factor accepted by [`replicated_coords`].
pub const MAX_REPLICATION_FACTOR: usize = 1024;

/// The coordinate list after replicating the interval starting at `index` by `factor`.
///
/// Coordinates up to and including `coords[index]` are kept, followed by
/// `factor` coordinates spaced by the interval's length. Every coordinate past
/// the interval's far edge moves up by `length * (factor - 1)`.
///
/// Returns `None` if `index` has no successor, or if `factor` is less than 2
/// or greater than [`MAX_REPLICATION_FACTOR`].
pub fn replicated_coords(coords: &[f64], index: usize, factor: usize) -> Option<Vec<f64>> {
    if !(2..=MAX_REPLICATION_FACTOR).contains(&factor) || index.checked_add(1)? >= coords.len() {
        return None;
    }
    let near = coords[index];
    let extent = coords[index + 1] - near;
    let shift = extent * (factor - 1) as f64;

    let mut out = Vec::with_capacity(coords.len().checked_add(factor)?);
    out.extend_from_slice(&coords[..=index]);
    out.extend((1..=factor).map(|k| near + extent * k as f64));
    out.extend(coords[index + 2..].iter().map(|c| c + shift));
    out.sort_by(f64::total_cmp);
    Some(out)
}
