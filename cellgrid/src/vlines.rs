//! Derivation of virtual lines from geometry touching cell edges.
//!
//! A virtual line always covers a whole cell edge. Its name is
//! `{source}_{cell}_{edge}`, where `source` is the material of the touching
//! element; repeated names within one derivation pass get `(1)`, `(2)`, ...
//! suffixes in the order the touching elements were created.

use std::collections::HashMap;

use subgeom::{Point, Rect, Segment, Side};

use crate::config::EditorConfig;
use crate::deps::arcstr::{self, ArcStr};
use crate::log::debug;
use crate::partition::{Cell, CellKey, CellManager, EdgeType};
use crate::scene::{Derivation, Element, ElementKind, ElementTrait, Scene, VLineKey, VirtualLine};

/// Source label for elements without a material.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// A virtual line proposed by one element touching one cell edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// The full edge, from its low end to its high end.
    pub segment: Segment,
    pub edge_type: EdgeType,
    pub cell: CellKey,
    pub cell_name: ArcStr,
    pub source: ArcStr,
}

impl Candidate {
    /// The base name, before any disambiguating suffix.
    pub fn base_name(&self) -> String {
        format!("{}_{}_{}", self.source, self.cell_name, self.edge_type)
    }
}

/// The sides of `rect` whose edge `pt` touches within `eps`, in
/// left, right, bottom, top order.
pub fn touched_sides(pt: Point, rect: &Rect, eps: f64) -> impl Iterator<Item = Side> {
    let edges = rect.edges();
    Side::ALL
        .into_iter()
        .filter(move |side| edges[*side].touches(pt, eps))
}

/// Returns true if `candidate` coincides with any of `existing`, endpoints
/// compared within `eps` in either orientation.
pub fn virtual_line_exists_at_position(
    candidate: &Candidate,
    existing: &[Candidate],
    eps: f64,
) -> bool {
    existing
        .iter()
        .any(|other| candidate.segment.coincides(&other.segment, eps))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualLineDeriver {
    pub edge_tolerance: f64,
    pub dedup_tolerance: f64,
}

impl Default for VirtualLineDeriver {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl VirtualLineDeriver {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            edge_tolerance: config.edge_tolerance,
            dedup_tolerance: config.dedup_tolerance,
        }
    }

    /// The first edge of `cell` touched by `pt`, if any.
    pub fn check_point_on_cell_edge(&self, pt: Point, cell: &Cell) -> Option<Candidate> {
        let side = touched_sides(pt, &cell.rect(), self.edge_tolerance).next()?;
        Some(self.candidate(cell, side, arcstr::literal!("")))
    }

    /// Proposes virtual lines for one element.
    ///
    /// Each wire endpoint yields at most one candidate per cell, the first
    /// touched edge in left, right, bottom, top order. A contact yields one
    /// candidate per touched edge. Transistors yield none. Candidates that
    /// coincide with an earlier candidate of the same element are dropped.
    ///
    /// If `only` is given, only that cell is considered.
    pub fn analyze_element_for_virtual_lines(
        &self,
        element: &Element,
        cells: &CellManager,
        only: Option<CellKey>,
    ) -> Vec<Candidate> {
        let source = match element.material() {
            m if m.is_empty() => arcstr::literal!(UNKNOWN_SOURCE),
            m => m,
        };
        let eps = self.edge_tolerance;
        let in_scope = |cell: &&Cell| only.map_or(true, |key| cell.id() == key);

        let mut found: Vec<Candidate> = Vec::new();
        let offer = |candidate: Candidate, found: &mut Vec<Candidate>| {
            if !virtual_line_exists_at_position(&candidate, found, self.dedup_tolerance) {
                found.push(candidate);
            }
        };

        match element {
            Element::Wire(w) => {
                for pt in [w.p0, w.p1] {
                    for cell in cells.cells().filter(in_scope) {
                        if let Some(side) = touched_sides(pt, &cell.rect(), eps).next() {
                            offer(self.candidate(cell, side, source.clone()), &mut found);
                        }
                    }
                }
            }
            Element::Contact(c) => {
                for cell in cells.cells().filter(in_scope) {
                    for side in touched_sides(c.center, &cell.rect(), eps) {
                        offer(self.candidate(cell, side, source.clone()), &mut found);
                    }
                }
            }
            Element::Transistor(_) => {}
        }
        found
    }

    /// Discards every virtual line and derives a fresh set from the wires and
    /// contacts in the scene.
    ///
    /// Wires are visited before contacts, each in creation order. Every
    /// resulting line is added to the scene and registered with the cells it
    /// lies on. Membership must be current before this runs.
    pub fn auto_create_virtual_lines(
        &self,
        scene: &mut Scene,
        cells: &mut CellManager,
    ) -> Vec<VLineKey> {
        scene.clear_vlines();
        cells.clear_virtual_lines();

        let mut candidates = Vec::new();
        for kind in [ElementKind::Wire, ElementKind::Contact] {
            for (_, element) in scene.elements().filter(|(_, e)| e.kind() == kind) {
                candidates.extend(self.analyze_element_for_virtual_lines(element, cells, None));
            }
        }

        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut created = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let base = candidate.base_name();
            let count = counts.entry(base.clone()).or_insert(0);
            let name: ArcStr = if *count == 0 {
                base.into()
            } else {
                arcstr::format!("{}({})", base, count)
            };
            *count += 1;

            cells.register_vline_intersections(&name, candidate.segment);
            created.push(scene.add_vline(VirtualLine {
                name,
                segment: candidate.segment,
                derivation: Some(Derivation {
                    source: candidate.source,
                    cell: candidate.cell,
                    edge_type: candidate.edge_type,
                }),
            }));
        }
        debug!("derived {} virtual lines", created.len());
        created
    }

    fn candidate(&self, cell: &Cell, side: Side, source: ArcStr) -> Candidate {
        Candidate {
            segment: cell.rect().edge(side).to_segment(),
            edge_type: side.into(),
            cell: cell.id(),
            cell_name: cell.name().clone(),
            source,
        }
    }
}
