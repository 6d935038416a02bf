use cellgrid::partition::{CellManager, CellOrigin};
use cellgrid::scene::{Contact, Scene, Wire};
use common::setup_editor;
use itertools::Itertools;
use subgeom::{Point, Rect};

mod common;

#[test]
fn test_partition_completeness() {
    let columns = [-40.0, 0.0, 60.0, 100.0, 240.0];
    let rows = [0.0, 20.0, 80.0];
    let mut cm = CellManager::default();
    cm.set_columns(columns);
    cm.set_rows(rows);

    assert_eq!(cm.len(), (columns.len() - 1) * (rows.len() - 1));
    for (i, (x1, x2)) in columns.iter().tuple_windows().enumerate() {
        for (j, (y1, y2)) in rows.iter().tuple_windows().enumerate() {
            let cell = cm.cell_at_index(i, j).unwrap();
            assert_eq!(cell.rect(), Rect::from_bounds(*x1, *y1, *x2, *y2));
            assert_eq!(cell.origin(), CellOrigin::Grid { col: i, row: j });
            assert_eq!(cell.name().as_str(), format!("cell{}{}", i + 1, j + 1));
        }
    }

    // No gaps or overlaps: total area matches the bounding area.
    let area: f64 = cm.cells().map(|c| c.rect().width() * c.rect().height()).sum();
    assert_eq!(area, 280.0 * 80.0);
}

#[test]
fn test_under_determined_partition() {
    let mut cm = CellManager::default();
    cm.add_column(0.0);
    cm.add_row(0.0);
    cm.add_row(40.0);
    assert!(cm.is_empty());
    cm.add_column(40.0);
    assert_eq!(cm.len(), 1);
}

#[test]
fn test_contact_assigned_to_exactly_one_cell() {
    let mut cm = CellManager::default();
    cm.set_columns([0.0, 40.0, 80.0]);
    cm.set_rows([0.0, 40.0, 80.0]);
    let mut scene = Scene::new();
    let on_corner = scene.add(Contact::new("CPA", 10.0, Point::new(40.0, 40.0)));
    let outside = scene.add(Contact::new("CPA", 10.0, Point::new(200.0, 40.0)));
    cm.assign_elements_to_cells(&scene);

    let owners = |key| cm.cells().filter(|c| c.elements().contains(&key)).count();
    assert_eq!(owners(on_corner), 1);
    assert_eq!(owners(outside), 0);
    // First-created cell wins on shared boundaries.
    assert!(cm
        .cell_named("cell11")
        .unwrap()
        .elements()
        .contains(&on_corner));
}

#[test]
fn test_wire_in_adjacent_cells_once_each() {
    let mut cm = CellManager::default();
    cm.set_columns([0.0, 40.0, 80.0]);
    cm.set_rows([0.0, 40.0]);
    let mut scene = Scene::new();
    let wire = scene.add(Wire::new("M2", -3, Point::new(20.0, 20.0), Point::new(60.0, 20.0)));

    for _ in 0..3 {
        cm.assign_elements_to_cells(&scene);
    }
    for name in ["cell11", "cell21"] {
        let cell = cm.cell_named(name).unwrap();
        assert_eq!(cell.elements().iter().filter(|k| **k == wire).count(), 1);
    }
}

#[test]
fn test_example_scenario() {
    let mut editor = setup_editor(&[0.0, 40.0, 80.0], &[0.0, 40.0]);
    assert_eq!(editor.cells().len(), 2);
    assert_eq!(
        editor.cells().cell_named("cell11").unwrap().rect(),
        Rect::from_bounds(0.0, 0.0, 40.0, 40.0)
    );
    assert_eq!(
        editor.cells().cell_named("cell21").unwrap().rect(),
        Rect::from_bounds(40.0, 0.0, 80.0, 40.0)
    );

    let wire = editor
        .add_wire("M2", -3, Point::new(0.0, 20.0), Point::new(40.0, 20.0))
        .unwrap();
    for name in ["cell11", "cell21"] {
        assert!(editor
            .cells()
            .cell_named(name)
            .unwrap()
            .elements()
            .contains(&wire));
    }

    let line = editor.scene().vline_named("M2_cell11_rht").unwrap();
    assert_eq!(line.segment.p0, Point::new(40.0, 0.0));
    assert_eq!(line.segment.p1, Point::new(40.0, 40.0));
}

#[test]
fn test_inserting_column_renames_downstream_cells() {
    let mut editor = setup_editor(&[0.0, 40.0, 80.0], &[0.0, 40.0]);
    let old = editor.cells().cell_named("cell21").unwrap().rect();
    assert!(editor.add_column(20.0));
    assert_eq!(editor.cells().cell_named("cell31").unwrap().rect(), old);
    assert!(!editor.add_column(20.0));
}

#[test]
fn test_remove_cell_keeps_partition() {
    let mut editor = setup_editor(&[0.0, 40.0, 80.0], &[0.0, 40.0]);
    editor
        .add_wire("M1", -3, Point::new(0.0, 20.0), Point::new(20.0, 20.0))
        .unwrap();
    editor.add_contact("CPA", Point::new(60.0, 20.0));

    let mut cells = editor.cells().clone();
    let mut scene = editor.scene().clone();
    let key = cells.cell_named("cell11").unwrap().id();
    let removed = cells.remove_cell(key, &mut scene).unwrap();

    assert_eq!(removed.name(), "cell11");
    assert_eq!(cells.len(), 1);
    assert_eq!(cells.columns(), &[0.0, 40.0, 80.0]);
    assert_eq!(cells.borders().len(), 1);
    assert_eq!(scene.len(), 1);
    assert!(scene.vline_named("M1_cell11_lft").is_none());
    assert!(cells.remove_cell(key, &mut scene).is_err());
}
