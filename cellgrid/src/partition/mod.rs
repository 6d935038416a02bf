//! The partition engine: columns and rows, the cells they imply, and the
//! per-cell membership index.
//!
//! Every derived structure here is rebuilt wholesale. Callers sequence the
//! rebuilds; see [`crate::editor::Editor`].

use grid::Grid;
use itertools::Itertools;
use slotmap::{Key, SlotMap};
use subgeom::bbox::BoundBox;
use subgeom::{approx_eq, Dir, Orientation, Point, Rect, Segment, Side};

use crate::config::EditorConfig;
use crate::deps::arcstr::ArcStr;
use crate::error::{ErrorSource, Result};
use crate::log::{debug, info, warn, LogSummary};
use crate::scene::{Element, Scene};

pub mod cell;

pub use cell::*;

/// A cell outline and label, as handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct CellBorder {
    pub cell: CellKey,
    pub rect: Rect,
    pub label: ArcStr,
    /// Index into a three-tint palette, cycling by creation order.
    pub shade: usize,
}

#[derive(Debug, Clone)]
pub struct CellManager {
    columns: Vec<f64>,
    rows: Vec<f64>,
    cells: SlotMap<CellKey, Cell>,
    /// Cell keys in creation order.
    order: Vec<CellKey>,
    /// Grid-derived cells indexed by (column, row).
    index: Option<Grid<CellKey>>,
    borders: Vec<CellBorder>,
    axis_tolerance: f64,
}

impl Default for CellManager {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl CellManager {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            cells: SlotMap::with_key(),
            order: Vec::new(),
            index: None,
            borders: Vec::new(),
            axis_tolerance: config.axis_tolerance,
        }
    }

    /// Column x-coordinates, ascending.
    #[inline]
    pub fn columns(&self) -> &[f64] {
        &self.columns
    }

    /// Row y-coordinates, ascending.
    #[inline]
    pub fn rows(&self) -> &[f64] {
        &self.rows
    }

    /// Inserts a column coordinate and rebuilds the cells.
    ///
    /// Returns `false`, leaving everything untouched, if the coordinate is already present.
    pub fn add_column(&mut self, x: f64) -> bool {
        let inserted = insert_sorted(&mut self.columns, x);
        if inserted {
            self.update_cells();
        }
        inserted
    }

    /// Inserts a row coordinate and rebuilds the cells.
    ///
    /// Returns `false`, leaving everything untouched, if the coordinate is already present.
    pub fn add_row(&mut self, y: f64) -> bool {
        let inserted = insert_sorted(&mut self.rows, y);
        if inserted {
            self.update_cells();
        }
        inserted
    }

    /// Replaces all column coordinates and rebuilds the cells.
    pub fn set_columns(&mut self, columns: impl IntoIterator<Item = f64>) {
        self.columns = sorted_unique(columns);
        self.update_cells();
    }

    /// Replaces all row coordinates and rebuilds the cells.
    pub fn set_rows(&mut self, rows: impl IntoIterator<Item = f64>) {
        self.rows = sorted_unique(rows);
        self.update_cells();
    }

    /// Discards every cell and derives a fresh set from the columns and rows.
    ///
    /// Injected cells are discarded too. Membership, virtual-line registrations
    /// and borders start out empty.
    pub fn update_cells(&mut self) {
        self.cells.clear();
        self.order.clear();
        self.borders.clear();
        self.index = None;

        if self.columns.len() < 2 || self.rows.len() < 2 {
            debug!(
                "partition under-determined ({} columns, {} rows); no cells",
                self.columns.len(),
                self.rows.len()
            );
            return;
        }

        let mut index = Grid::init(
            self.columns.len() - 1,
            self.rows.len() - 1,
            CellKey::null(),
        );
        for (i, (&x1, &x2)) in self.columns.iter().tuple_windows().enumerate() {
            for (j, (&y1, &y2)) in self.rows.iter().tuple_windows().enumerate() {
                let rect = Rect::from_bounds(x1, y1, x2, y2);
                let key = self
                    .cells
                    .insert_with_key(|key| Cell::grid(key, i, j, rect));
                self.order.push(key);
                if let Some(slot) = index.get_mut(i, j) {
                    *slot = key;
                }
            }
        }
        self.index = Some(index);
        self.log_summary();
    }

    /// Cells in creation order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.order.iter().filter_map(|key| self.cells.get(*key))
    }

    #[inline]
    pub fn cell(&self, key: CellKey) -> Option<&Cell> {
        self.cells.get(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Looks up a cell by display name.
    pub fn cell_named(&self, name: &str) -> Option<&Cell> {
        self.cells().find(|cell| cell.name() == name)
    }

    /// Looks up a grid-derived cell by 0-based column and row index.
    pub fn cell_at_index(&self, col: usize, row: usize) -> Option<&Cell> {
        let key = *self.index.as_ref()?.get(col, row)?;
        self.cells.get(key)
    }

    /// Returns the first cell, in creation order, containing `pt`.
    ///
    /// Containment is closed, so a point on a shared boundary resolves to the
    /// earlier cell: lowest column index, then lowest row index, with injected
    /// cells after all grid cells.
    pub fn get_cell_at(&self, pt: Point) -> Option<&Cell> {
        self.cells().find(|cell| cell.contains(pt))
    }

    /// All cells containing `pt`, in creation order.
    pub fn cells_containing(&self, pt: Point) -> impl Iterator<Item = &Cell> {
        self.cells().filter(move |cell| cell.contains(pt))
    }

    /// Returns the first cell whose lower-left corner lies within `eps` of `origin`.
    pub fn cell_with_origin(&self, origin: Point, eps: f64) -> Option<&Cell> {
        self.cells()
            .find(|cell| cell.rect().p0.approx_eq(&origin, eps))
    }

    /// Rebuilds every cell's member list from the scene.
    ///
    /// A wire joins every cell containing either endpoint, once per cell.
    /// A contact joins the first cell containing its center. A transistor
    /// joins the first cell containing the center of its bounding box.
    pub fn assign_elements_to_cells(&mut self, scene: &Scene) {
        for cell in self.cells.values_mut() {
            cell.clear_membership();
        }

        let mut assigned = 0;
        for (key, element) in scene.elements() {
            let targets: Vec<CellKey> = match element {
                Element::Wire(w) => self
                    .cells()
                    .filter(|cell| cell.contains(w.p0) || cell.contains(w.p1))
                    .map(Cell::id)
                    .collect(),
                Element::Contact(c) => self.get_cell_at(c.center).map(Cell::id).into_iter().collect(),
                Element::Transistor(t) => self
                    .get_cell_at(t.bbox().center())
                    .map(Cell::id)
                    .into_iter()
                    .collect(),
            };
            for target in targets {
                if let Some(cell) = self.cells.get_mut(target) {
                    cell.push_element(key, element);
                    assigned += 1;
                }
            }
        }
        debug!(
            "assigned {} memberships for {} elements across {} cells",
            assigned,
            scene.len(),
            self.len()
        );
    }

    /// Removes a single cell and everything drawn inside it.
    ///
    /// Deletes the cell's border, every wire with an endpoint inside the cell,
    /// every contact centered inside it, every transistor whose bounding-box
    /// center lies inside it, and every virtual line whose name starts with the
    /// cell name or contains `_{name}_`. Columns and rows are left untouched.
    pub fn remove_cell(&mut self, key: CellKey, scene: &mut Scene) -> Result<Cell> {
        let cell = self.cells.remove(key).ok_or(ErrorSource::CellNotFound)?;
        self.order.retain(|k| *k != key);
        self.borders.retain(|b| b.cell != key);
        if let (CellOrigin::Grid { col, row }, Some(index)) = (cell.origin(), self.index.as_mut()) {
            if let Some(slot) = index.get_mut(col, row) {
                *slot = CellKey::null();
            }
        }

        let rect = cell.rect();
        let removed_elements = scene.retain(|_, element| !element.is_anchored_in(&rect));

        let infix = format!("_{}_", cell.name());
        let prefix = cell.name().as_str();
        let removed_lines =
            scene.remove_vlines_where(|vl| vl.name.starts_with(prefix) || vl.name.contains(&infix));
        for other in self.cells.values_mut() {
            for name in removed_lines.iter() {
                other.purge_vline(name);
            }
        }

        info!(
            "removed cell {} with {} elements and {} virtual lines",
            cell.name(),
            removed_elements,
            removed_lines.len()
        );
        Ok(cell)
    }

    /// Appends a cell built outside the column/row partition.
    ///
    /// The cell is exempt from the columns-by-rows invariant until the next
    /// [`CellManager::update_cells`], which discards it.
    ///
    /// A cell whose id is already present is not added again; its existing
    /// key is returned.
    pub fn add_cell(&mut self, mut cell: Cell) -> CellKey {
        if self.cells.contains_key(cell.id) {
            debug!("cell {} is already present", cell.name());
            return cell.id;
        }
        let key = self.cells.insert_with_key(|key| {
            cell.id = key;
            cell
        });
        self.order.push(key);
        key
    }

    /// Renames a cell. Names must stay unique.
    pub fn rename_cell(&mut self, key: CellKey, name: impl Into<ArcStr>) -> Result<()> {
        let name = name.into();
        if self.cells().any(|cell| cell.id() != key && *cell.name() == name) {
            return Err(ErrorSource::AlreadyExists(name).into());
        }
        let cell = self.cells.get_mut(key).ok_or(ErrorSource::CellNotFound)?;
        cell.set_name(name.clone());
        for border in self.borders.iter_mut().filter(|b| b.cell == key) {
            border.label = name.clone();
        }
        Ok(())
    }

    /// Registers a named line against every cell edge it lies on.
    ///
    /// Earlier registrations under the same name are purged first. A vertical
    /// line registers as `lft`/`rht` on cells whose left/right boundary matches
    /// its x-coordinate and whose closed y-span intersects the line's, so a
    /// line ending at a corner also registers on the cells beyond it.
    /// Horizontal lines likewise register as `btm`/`top`. Diagonal lines are
    /// rejected. Returns the number of registrations made.
    pub fn register_vline_intersections(&mut self, name: &str, line: Segment) -> usize {
        for cell in self.cells.values_mut() {
            cell.purge_vline(name);
        }

        let eps = self.axis_tolerance;
        let sides = match line.classify(eps) {
            Orientation::Vertical => Side::with_dir(Dir::Horiz),
            Orientation::Horizontal => Side::with_dir(Dir::Vert),
            Orientation::Diagonal => {
                warn!(
                    "virtual line {} is neither vertical nor horizontal; not registered",
                    name
                );
                return 0;
            }
        };
        // Both sides share a coordinate direction.
        let coord_dir = sides[0].coord_dir();
        let value = line.p0.coord(coord_dir);
        let extent = line.span(!coord_dir);

        let mut registrations = 0;
        for key in self.order.iter() {
            let Some(cell) = self.cells.get_mut(*key) else {
                continue;
            };
            let rect = cell.rect();
            for side in sides {
                if approx_eq(value, rect.side(side), eps)
                    && extent.intersects(&rect.span(!coord_dir))
                {
                    cell.register_vline(VLineRegistration {
                        name: name.into(),
                        relation: side.into(),
                        value,
                    });
                    registrations += 1;
                }
            }
        }
        registrations
    }

    /// Drops every virtual-line registration from every cell.
    pub fn clear_virtual_lines(&mut self) {
        for cell in self.cells.values_mut() {
            cell.clear_virtual_lines();
        }
    }

    /// Rebuilds the border display list from the current cells.
    pub fn draw_cell_borders(&mut self) {
        self.borders = self
            .order
            .iter()
            .filter_map(|key| self.cells.get(*key))
            .enumerate()
            .map(|(i, cell)| CellBorder {
                cell: cell.id(),
                rect: cell.rect(),
                label: cell.name().clone(),
                shade: i % 3,
            })
            .collect();
    }

    #[inline]
    pub fn borders(&self) -> &[CellBorder] {
        &self.borders
    }
}

impl LogSummary for CellManager {
    fn log_summary(&self) {
        debug!(
            "partition: {} columns, {} rows, {} cells",
            self.columns.len(),
            self.rows.len(),
            self.len()
        );
    }
}

fn insert_sorted(coords: &mut Vec<f64>, value: f64) -> bool {
    if coords.contains(&value) {
        return false;
    }
    coords.push(value);
    coords.sort_by(f64::total_cmp);
    true
}

fn sorted_unique(coords: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut coords: Vec<f64> = coords.into_iter().collect();
    coords.sort_by(f64::total_cmp);
    coords.dedup();
    coords
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Contact, Wire};

    fn manager(columns: &[f64], rows: &[f64]) -> CellManager {
        let mut cm = CellManager::default();
        cm.set_columns(columns.iter().copied());
        cm.set_rows(rows.iter().copied());
        cm
    }

    #[test]
    fn test_add_cell_skips_present_cell() {
        let mut cm = manager(&[0.0, 40.0], &[0.0, 40.0]);
        let key = cm.add_cell(Cell::new("extra", Rect::from_bounds(40.0, 0.0, 80.0, 40.0)));
        assert_eq!(cm.len(), 2);

        let again = cm.cell(key).unwrap().clone();
        assert_eq!(cm.add_cell(again), key);
        assert_eq!(cm.len(), 2);

        let mut scene = Scene::new();
        let removed = cm.remove_cell(key, &mut scene).unwrap();
        let fresh = cm.add_cell(removed);
        assert_ne!(fresh, key);
        assert_eq!(cm.len(), 2);
        assert_eq!(cm.cell(fresh).unwrap().name(), "extra");
    }

    #[test]
    fn test_add_column_is_idempotent() {
        let mut cm = manager(&[0.0, 40.0], &[0.0, 40.0]);
        assert!(cm.add_column(80.0));
        assert!(!cm.add_column(80.0));
        assert_eq!(cm.columns(), &[0.0, 40.0, 80.0]);
        assert_eq!(cm.len(), 2);
    }

    #[test]
    fn test_columns_stay_sorted() {
        let mut cm = CellManager::default();
        for x in [80.0, 0.0, 40.0] {
            cm.add_column(x);
        }
        assert_eq!(cm.columns(), &[0.0, 40.0, 80.0]);
        assert!(cm.is_empty());
    }

    #[test]
    fn test_cell_at_index() {
        let cm = manager(&[0.0, 40.0, 80.0], &[0.0, 40.0, 120.0]);
        let cell = cm.cell_at_index(1, 1).unwrap();
        assert_eq!(cell.name(), "cell22");
        assert_eq!(cell.rect(), Rect::from_bounds(40.0, 40.0, 80.0, 120.0));
        assert!(cm.cell_at_index(2, 0).is_none());
    }

    #[test]
    fn test_shared_boundary_resolves_to_first_cell() {
        let cm = manager(&[0.0, 40.0, 80.0], &[0.0, 40.0, 80.0]);
        assert_eq!(cm.get_cell_at(Point::new(40.0, 40.0)).unwrap().name(), "cell11");
        assert_eq!(cm.get_cell_at(Point::new(40.0, 60.0)).unwrap().name(), "cell12");
        assert_eq!(cm.cells_containing(Point::new(40.0, 40.0)).count(), 4);
        assert!(cm.get_cell_at(Point::new(81.0, 0.0)).is_none());
    }

    #[test]
    fn test_register_vertical_line_on_shared_edge() {
        let mut cm = manager(&[0.0, 40.0, 80.0], &[0.0, 40.0, 80.0]);
        let line = Segment::new(Point::new(40.0, 0.0), Point::new(40.0, 40.0));
        assert_eq!(cm.register_vline_intersections("M2_cell11_rht", line), 4);

        let cell11 = cm.cell_named("cell11").unwrap();
        assert_eq!(cell11.virtual_lines().len(), 1);
        assert_eq!(cell11.virtual_lines()[0].relation, EdgeType::Rht);
        assert_eq!(cell11.virtual_lines()[0].value, 40.0);
        let cell21 = cm.cell_named("cell21").unwrap();
        assert_eq!(cell21.virtual_lines()[0].relation, EdgeType::Lft);
        // Cells meeting the line only at its end point register it too.
        let cell12 = cm.cell_named("cell12").unwrap();
        assert_eq!(cell12.virtual_lines()[0].relation, EdgeType::Rht);
        let cell22 = cm.cell_named("cell22").unwrap();
        assert_eq!(cell22.virtual_lines()[0].relation, EdgeType::Lft);
    }

    #[test]
    fn test_register_rejects_diagonal() {
        let mut cm = manager(&[0.0, 40.0], &[0.0, 40.0]);
        let line = Segment::new(Point::new(0.0, 0.0), Point::new(40.0, 40.0));
        assert_eq!(cm.register_vline_intersections("diag", line), 0);
        assert!(cm.cells().all(|c| c.virtual_lines().is_empty()));
    }

    #[test]
    fn test_remove_cell_purges_content() {
        let mut cm = manager(&[0.0, 40.0, 80.0], &[0.0, 40.0]);
        cm.draw_cell_borders();
        let mut scene = Scene::new();
        scene.add(Wire::new("M2", -3, Point::new(20.0, 20.0), Point::new(60.0, 20.0)));
        let kept = scene.add(Wire::new("M2", -3, Point::new(60.0, 0.0), Point::new(60.0, 40.0)));
        scene.add(Contact::new("CPA", 10.0, Point::new(20.0, 20.0)));
        scene.add_vline(crate::scene::VirtualLine {
            name: "M2_cell11_lft".into(),
            segment: Segment::new(Point::new(0.0, 0.0), Point::new(0.0, 40.0)),
            derivation: None,
        });
        cm.register_vline_intersections(
            "M2_cell11_rht",
            Segment::new(Point::new(40.0, 0.0), Point::new(40.0, 40.0)),
        );

        let key = cm.cell_named("cell11").unwrap().id();
        let removed = cm.remove_cell(key, &mut scene).unwrap();
        assert_eq!(removed.name(), "cell11");
        assert_eq!(cm.len(), 1);
        assert_eq!(cm.borders().len(), 1);
        assert_eq!(cm.columns(), &[0.0, 40.0, 80.0]);
        assert_eq!(scene.keys(), vec![kept]);
        assert_eq!(scene.num_vlines(), 0);
        assert!(cm.cell_at_index(0, 0).is_none());
        assert!(cm.remove_cell(key, &mut scene).is_err());
    }

    #[test]
    fn test_add_cell_and_rename() {
        let mut cm = manager(&[0.0, 40.0], &[0.0, 40.0]);
        let key = cm.add_cell(Cell::new("extra", Rect::from_bounds(0.0, 40.0, 40.0, 80.0)));
        assert_eq!(cm.len(), 2);
        assert_eq!(cm.cell(key).unwrap().origin(), CellOrigin::Injected);
        assert_eq!(cm.cell(key).unwrap().id(), key);

        assert!(cm.rename_cell(key, "cell11").is_err());
        cm.rename_cell(key, "top").unwrap();
        assert_eq!(cm.cell_named("top").unwrap().id(), key);

        cm.update_cells();
        assert!(cm.cell(key).is_none());
        assert_eq!(cm.len(), 1);
    }
}
