//! The editing session: one scene, its partition, and the derived buffers.
//!
//! Every public operation leaves the editor consistent. Geometric edits
//! re-run element assignment and virtual-line derivation; structural edits
//! additionally redraw borders and rebuild buffers.

use std::collections::HashSet;
use std::path::Path;

use subgeom::transform::{Translate, TranslateOwned};
use subgeom::{snap_to_grid, Orientation, Point};

use crate::buffer::{replicated_coords, BufferKind, BufferManager};
use crate::cif::export_cif;
use crate::config::EditorConfig;
use crate::deps::arcstr::{self, ArcStr};
use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};
use crate::log::{info, warn, LogSummary};
use crate::partition::{Cell, CellKey, CellManager, CellOrigin};
use crate::scene::{
    Contact, Direction, Element, ElementKey, Scene, Transistor, TransistorKind, VirtualLine, Wire,
};
use crate::spec::{export_layout, CellSpec};
use crate::vlines::VirtualLineDeriver;

/// Where [`Editor::copy_cell`] places the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyDirection {
    /// One cell width to the right.
    X,
    /// One cell height up.
    Y,
    /// One step up and to the right.
    #[default]
    Offset,
}

#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    cells: CellManager,
    buffers: BufferManager,
    deriver: VirtualLineDeriver,
}

impl Default for Editor {
    fn default() -> Self {
        Self::with_checked_config(EditorConfig::default())
    }
}

impl Editor {
    /// Creates an empty editor.
    ///
    /// Fails with [`ErrorSource::InvalidArgs`] if the cell size or step of
    /// `config` is not positive.
    pub fn new(config: EditorConfig) -> Result<Self> {
        config.check()?;
        Ok(Self::with_checked_config(config))
    }

    fn with_checked_config(config: EditorConfig) -> Self {
        Self {
            scene: Scene::new(),
            cells: CellManager::new(&config),
            buffers: BufferManager::new(&config),
            deriver: VirtualLineDeriver::new(&config),
            config,
        }
    }

    /// Creates an editor partitioned by the given column and row coordinates.
    pub fn with_partition(
        config: EditorConfig,
        columns: impl IntoIterator<Item = f64>,
        rows: impl IntoIterator<Item = f64>,
    ) -> Result<Self> {
        let mut editor = Self::new(config)?;
        let step = editor.config.cell_size;
        editor
            .cells
            .set_columns(columns.into_iter().map(|x| snap_to_grid(x, step)));
        editor
            .cells
            .set_rows(rows.into_iter().map(|y| snap_to_grid(y, step)));
        editor.refresh_structure();
        Ok(editor)
    }

    #[inline]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn cells(&self) -> &CellManager {
        &self.cells
    }

    #[inline]
    pub fn buffers(&self) -> &BufferManager {
        &self.buffers
    }

    fn snap(&self, pt: Point) -> Point {
        pt.snap_to_grid(self.config.cell_size)
    }

    /// Inserts a column at `x`, snapped to the grid.
    ///
    /// Returns `false` if the column already exists.
    pub fn add_column(&mut self, x: f64) -> bool {
        let added = self.cells.add_column(snap_to_grid(x, self.config.cell_size));
        if added {
            self.refresh_structure();
        }
        added
    }

    /// Inserts a row at `y`, snapped to the grid.
    ///
    /// Returns `false` if the row already exists.
    pub fn add_row(&mut self, y: f64) -> bool {
        let added = self.cells.add_row(snap_to_grid(y, self.config.cell_size));
        if added {
            self.refresh_structure();
        }
        added
    }

    pub fn add_wire(
        &mut self,
        material: impl Into<ArcStr>,
        width: i64,
        p0: Point,
        p1: Point,
    ) -> Result<ElementKey> {
        let wire = Wire::new(material, width, self.snap(p0), self.snap(p1));
        if wire.segment().classify(self.config.axis_tolerance) == Orientation::Diagonal {
            return Err(ErrorSource::InvalidArgs(format!(
                "wires must be horizontal or vertical (got {:?} to {:?})",
                wire.p0, wire.p1
            ))
            .into());
        }
        Ok(self.insert(wire))
    }

    /// Places a wire using the configured default material and width.
    pub fn add_default_wire(&mut self, p0: Point, p1: Point) -> Result<ElementKey> {
        let material = self.config.default_wire_material.clone();
        self.add_wire(material, self.config.default_wire_width, p0, p1)
    }

    pub fn add_contact(&mut self, material: impl Into<ArcStr>, center: Point) -> ElementKey {
        let contact = Contact::new(material, self.config.contact_size, self.snap(center));
        self.insert(contact)
    }

    /// Places a contact of the configured default material.
    pub fn add_default_contact(&mut self, center: Point) -> ElementKey {
        let material = self.config.default_contact_material.clone();
        self.add_contact(material, center)
    }

    /// Places a transistor whose body's bottom-center sits at `loc`.
    pub fn add_transistor(
        &mut self,
        kind: TransistorKind,
        direction: Direction,
        loc: Point,
    ) -> ElementKey {
        let transistor = Transistor {
            kind,
            direction,
            loc: self.snap(loc),
            width: self.config.transistor_width,
            line_length: self.config.transistor_line_length,
            body_size: self.config.step,
        };
        self.insert(transistor)
    }

    fn insert(&mut self, element: impl Into<Element>) -> ElementKey {
        let key = self.scene.add(element);
        self.refresh_membership();
        key
    }

    /// Moves an element by `offset`, snapped to the grid.
    pub fn move_element(&mut self, key: ElementKey, offset: Point) -> Result<()> {
        let offset = self.snap(offset);
        self.scene
            .get_mut(key)
            .ok_or(ErrorSource::ElementNotFound)?
            .translate(offset);
        self.refresh_membership();
        Ok(())
    }

    pub fn remove_element(&mut self, key: ElementKey) -> Result<Element> {
        let element = self.scene.remove(key).ok_or(ErrorSource::ElementNotFound)?;
        self.refresh_membership();
        Ok(element)
    }

    /// Rebuilds every derived structure from the columns, rows and scene.
    ///
    /// Injected cells are discarded.
    pub fn resync(&mut self) {
        self.cells.update_cells();
        self.refresh_structure();
    }

    fn refresh_membership(&mut self) {
        self.cells.assign_elements_to_cells(&self.scene);
        self.deriver
            .auto_create_virtual_lines(&mut self.scene, &mut self.cells);
    }

    fn refresh_structure(&mut self) {
        self.cells.draw_cell_borders();
        self.refresh_membership();
        self.refresh_buffers();
    }

    fn refresh_buffers(&mut self) {
        self.buffers
            .update_comments(self.cells.columns(), self.cells.rows(), &self.cells);
    }

    /// Replicates a buffer `factor` times along its axis.
    ///
    /// The buffer's interval is repeated `factor` times and everything past its
    /// far edge moves out by `extent * (factor - 1)`. The wires and contacts of
    /// each linked cell are copied to offsets `extent * k` for `k` in
    /// `1..=factor`, wherever a cell exists at that offset. The last offset
    /// lands on the first cell past the replicas. An element touching several
    /// linked cells is copied once per offset.
    ///
    /// Returns `false` without changing anything if the buffer does not exist,
    /// links no cells, or `factor` is outside `2..=MAX_REPLICATION_FACTOR`.
    pub fn replicate_buffer(
        &mut self,
        kind: BufferKind,
        index: usize,
        factor: usize,
    ) -> Result<bool> {
        let Some(buffer) = self.buffers.buffer(kind, index) else {
            warn!("no {} buffer at index {}; nothing replicated", kind, index);
            return Ok(false);
        };
        let coords = match kind {
            BufferKind::Column => self.cells.columns(),
            BufferKind::Row => self.cells.rows(),
        };
        let Some(new_coords) = replicated_coords(coords, index, factor) else {
            warn!("cannot replicate {} buffer {} by {}", kind, index, factor);
            return Ok(false);
        };

        let dir = kind.dir();
        let eps = self.config.boundary_tolerance;
        let extent = buffer.extent();
        let far = buffer.span.stop();

        // Sources are captured before anything moves.
        let sources: Vec<(CellOrigin, Point, Vec<(ElementKey, Element)>)> = buffer
            .linked_cells
            .iter()
            .filter_map(|key| self.cells.cell(*key))
            .map(|cell| {
                let area = cell.rect().expand(eps);
                let elements = self
                    .scene
                    .elements()
                    .filter(|(_, e)| !matches!(e, Element::Transistor(_)) && e.is_anchored_in(&area))
                    .map(|(key, e)| (key, e.clone()))
                    .collect();
                (cell.origin(), cell.rect().p0, elements)
            })
            .collect();
        if sources.is_empty() {
            warn!("{} buffer {} links no cells; nothing replicated", kind, index);
            return Ok(false);
        }

        let shift = extent * (factor - 1) as f64;
        for key in self.scene.keys() {
            if let Some(element) = self.scene.get_mut(key) {
                element.shift_beyond(dir, far + eps, shift);
            }
        }
        match kind {
            BufferKind::Column => self.cells.set_columns(new_coords),
            BufferKind::Row => self.cells.set_rows(new_coords),
        }

        let mut copies = 0;
        for k in 1..=factor {
            let offset = Point::offset(extent * k as f64, dir);
            let mut copied = HashSet::new();
            for (origin, corner, elements) in sources.iter() {
                let target = match (*origin, kind) {
                    (CellOrigin::Grid { col, row }, BufferKind::Column) => {
                        self.cells.cell_at_index(col + k, row)
                    }
                    (CellOrigin::Grid { col, row }, BufferKind::Row) => {
                        self.cells.cell_at_index(col, row + k)
                    }
                    (CellOrigin::Injected, _) => self.cells.cell_with_origin(*corner + offset, eps),
                };
                if target.is_none() {
                    continue;
                }
                for (key, element) in elements {
                    if copied.insert(*key) {
                        self.scene.add(element.clone().translate_owned(offset));
                        copies += 1;
                    }
                }
            }
        }

        self.refresh_structure();
        info!(
            "replicated {} buffer {} by {}: {} element copies",
            kind, index, factor, copies
        );
        Ok(true)
    }

    /// Copies a cell and its member elements next to the original.
    ///
    /// The copy is injected outside the column/row partition and named
    /// `{name}copy{n}` with the smallest unused `n`.
    pub fn copy_cell(&mut self, key: CellKey, direction: CopyDirection) -> Result<CellKey> {
        let cell = self.cells.cell(key).ok_or(ErrorSource::CellNotFound)?;
        let rect = cell.rect();
        let offset = match direction {
            CopyDirection::X => Point::new(rect.width(), 0.0),
            CopyDirection::Y => Point::new(0.0, rect.height()),
            CopyDirection::Offset => Point::new(self.config.step, self.config.step),
        };
        let name = (1..)
            .map(|n| arcstr::format!("{}copy{}", cell.name(), n))
            .find(|name| self.cells.cell_named(name).is_none())
            .ok_or_else(|| ErrorSource::Internal("no free cell name".to_string()))?;
        let members: Vec<Element> = cell
            .elements()
            .iter()
            .filter_map(|key| self.scene.get(*key))
            .map(|element| element.clone().translate_owned(offset))
            .collect();

        let num_members = members.len();
        for element in members {
            self.scene.add(element);
        }
        info!("copied {} to {} with {} elements", cell.name(), name, num_members);
        let copy = self.cells.add_cell(Cell::new(name, rect.translate_owned(offset)));
        self.refresh_structure();
        Ok(copy)
    }

    pub fn rename_cell(&mut self, key: CellKey, name: impl Into<ArcStr>) -> Result<()> {
        let name = name.into();
        with_err_context(self.cells.rename_cell(key, name.clone()), || {
            ErrorContext::RenameCell(name)
        })?;
        self.refresh_buffers();
        Ok(())
    }

    pub fn rename_buffer(&mut self, kind: BufferKind, index: usize, text: &str) -> Result<()> {
        self.buffers.rename(kind, index, text)
    }

    /// Replaces a cell with the one described by fragment text.
    ///
    /// The text is parsed first; on failure nothing changes. If a cell with the
    /// parsed name exists, it is removed along with its content and the new
    /// cell takes its lower-left corner. Otherwise the fragment is placed at
    /// the plane origin. Declared virtual lines are registered as written and
    /// are not re-derived.
    pub fn rebuild_cell_from_spec(&mut self, text: &str) -> Result<CellKey> {
        let spec = with_err_context(CellSpec::parse(text, &self.config), || {
            ErrorContext::RebuildCell
        })?;

        let existing = self
            .cells
            .cell_named(&spec.name)
            .map(|cell| (cell.id(), cell.rect().p0));
        let origin = match existing {
            Some((old, corner)) => {
                self.cells.remove_cell(old, &mut self.scene)?;
                corner
            }
            None => Point::zero(),
        };
        let spec = spec.translated(origin);

        let key = self.cells.add_cell(Cell::new(spec.name.clone(), spec.bounds));
        let num_elements = spec.elements.len();
        for element in spec.elements {
            self.scene.add(element);
        }
        for decl in spec.vlines.iter() {
            let segment = decl.segment(&spec.bounds);
            self.scene.add_vline(VirtualLine {
                name: decl.name.clone(),
                segment,
                derivation: None,
            });
            self.cells.register_vline_intersections(&decl.name, segment);
        }

        self.cells.draw_cell_borders();
        self.cells.assign_elements_to_cells(&self.scene);
        self.refresh_buffers();
        info!(
            "rebuilt cell {} with {} elements and {} virtual lines",
            spec.name,
            num_elements,
            spec.vlines.len()
        );
        self.scene.log_summary();
        Ok(key)
    }

    /// Reads fragment text from a file and rebuilds the cell it describes.
    pub fn rebuild_cell_from_file(&mut self, path: impl AsRef<Path>) -> Result<CellKey> {
        let path = path.as_ref();
        let text = with_err_context(std::fs::read_to_string(path), || {
            ErrorContext::ReadFile(path.to_path_buf())
        })?;
        with_err_context(self.rebuild_cell_from_spec(&text), || {
            ErrorContext::ReadFile(path.to_path_buf())
        })
    }

    /// The fragment text describing a cell and the elements anchored in it.
    pub fn export_cell_spec(&self, key: CellKey) -> Result<String> {
        let cell = self.cells.cell(key).ok_or(ErrorSource::CellNotFound)?;
        Ok(export_layout(cell, &self.scene, &self.config))
    }

    /// Every cell and buffer of the partition as a CIF file.
    pub fn export_cif(&self) -> String {
        export_cif(&self.cells, &self.buffers)
    }
}
