//! CIF export of a whole partition.
//!
//! Every cell is written as its own symbol, followed by one fragment symbol per
//! buffer. Fragment ids start at 101 so that they never collide with the
//! per-cell definitions.

use std::fmt::Write;

use crate::buffer::BufferManager;
use crate::partition::CellManager;

/// Fragment id of the first buffer.
pub const FRAGMENT_ID_BASE: u32 = 100;

/// Writes every cell in creation order, then every buffer, as a CIF 2.0 file.
pub fn export_cif(cells: &CellManager, buffers: &BufferManager) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "CIF 2.0;");
    let _ = writeln!(out, "(Generated by cellgrid);");
    for (i, cell) in (1..).zip(cells.cells()) {
        let _ = writeln!(out);
        let _ = writeln!(out, "(Cell {}: {});", i, cell.name());
        let _ = writeln!(out, "{}", cell.to_cif());
    }
    for (i, buffer) in (1..).zip(buffers.buffers()) {
        let _ = writeln!(out);
        let _ = writeln!(out, "(Fragment {}: {});", i, buffer.text);
        let _ = writeln!(out, "{}", buffer.to_cif(FRAGMENT_ID_BASE + i, cells));
    }
    out.push_str("E\n");
    out
}

#[cfg(test)]
mod tests {
    use subgeom::Point;

    use super::*;
    use crate::scene::{Contact, Scene};

    #[test]
    fn test_export_cif_writes_cells_then_fragments() {
        let mut cm = CellManager::default();
        cm.set_columns([0.0, 40.0]);
        cm.set_rows([0.0, 40.0]);
        let mut scene = Scene::new();
        scene.add(Contact::new("CPA", 10.0, Point::new(20.0, 20.0)));
        cm.assign_elements_to_cells(&scene);
        let mut bm = BufferManager::default();
        bm.update_comments(cm.columns(), cm.rows(), &cm);

        let cif = export_cif(&cm, &bm);
        let expected = "CIF 2.0;\n(Generated by cellgrid);\n\n\
            (Cell 1: cell11);\nDS 0 0 40 40;\nL CPA;\nC CPA 10 (20 20);\n\n\
            (Fragment 1: Column buffer 1);\n\
            DS 101 1 1;\n9 Column_buffer_1;\nL Cell_1;\nC CPA T 20 20;\nDF;\n\n\
            (Fragment 2: Row buffer 1);\n\
            DS 102 1 1;\n9 Row_buffer_1;\nL Cell_1;\nC CPA T 20 20;\nDF;\nE\n";
        assert_eq!(cif, expected);
    }

    #[test]
    fn test_export_cif_of_empty_partition() {
        let cif = export_cif(&CellManager::default(), &BufferManager::default());
        assert_eq!(cif, "CIF 2.0;\n(Generated by cellgrid);\nE\n");
    }
}
