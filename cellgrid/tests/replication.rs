use cellgrid::buffer::{BufferKind, MAX_REPLICATION_FACTOR};
use cellgrid::scene::{Direction, TransistorKind};
use common::setup_editor;
use float_eq::assert_float_eq;
use subgeom::Point;

mod common;

#[test]
fn test_column_replication_size_law() {
    let columns = [0.0, 40.0, 80.0, 200.0, 240.0];
    for factor in 2..=5 {
        let mut editor = setup_editor(&columns, &[0.0, 40.0]);
        assert!(editor
            .replicate_buffer(BufferKind::Column, 1, factor)
            .unwrap());

        let width = 40.0;
        let after = editor.cells().columns();
        assert_eq!(after.len(), columns.len() + factor - 1);
        for (old, new) in columns[3..].iter().zip(after[after.len() - 2..].iter()) {
            assert_float_eq!(*new, old + width * (factor - 1) as f64, abs <= 1e-9);
        }
        assert_eq!(editor.cells().len(), after.len() - 1);
        assert_eq!(
            editor.buffers().buffers().len(),
            (after.len() - 1) + 1,
            "one buffer per column interval plus the single row buffer"
        );
    }
}

#[test]
fn test_column_replication_copies_content() {
    let mut editor = setup_editor(&[0.0, 40.0, 80.0, 200.0], &[0.0, 40.0]);
    editor.add_contact("CPA", Point::new(60.0, 20.0));
    editor
        .add_wire("M2", -3, Point::new(100.0, 20.0), Point::new(140.0, 20.0))
        .unwrap();
    editor.add_transistor(TransistorKind::Tp, Direction::North, Point::new(60.0, 0.0));

    assert!(editor
        .replicate_buffer(BufferKind::Column, 1, 3)
        .unwrap());
    assert_eq!(
        editor.cells().columns(),
        &[0.0, 40.0, 80.0, 120.0, 160.0, 280.0]
    );

    let contacts: Vec<Point> = editor.scene().contacts().map(|(_, c)| c.center).collect();
    assert_eq!(
        contacts,
        vec![
            Point::new(60.0, 20.0),
            Point::new(100.0, 20.0),
            Point::new(140.0, 20.0),
            Point::new(180.0, 20.0)
        ]
    );
    // Transistors are not replicated.
    assert_eq!(editor.scene().transistors().count(), 1);

    // Content past the buffer moves with its columns.
    let (_, wire) = editor.scene().wires().next().unwrap();
    assert_eq!(wire.p0, Point::new(180.0, 20.0));
    assert_eq!(wire.p1, Point::new(220.0, 20.0));

    // The last copy lands in the first cell past the replicas.
    for (name, count) in [("cell21", 2), ("cell31", 1), ("cell41", 1), ("cell51", 2)] {
        assert_eq!(
            editor.cells().cell_named(name).unwrap().elements().len(),
            count,
            "{name}"
        );
    }
}

#[test]
fn test_row_replication_copies_shared_wire_once() {
    let mut editor = setup_editor(&[0.0, 40.0, 80.0], &[0.0, 40.0, 80.0]);
    editor
        .add_wire("M1", -3, Point::new(20.0, 20.0), Point::new(60.0, 20.0))
        .unwrap();
    editor.add_contact("CPA", Point::new(20.0, 60.0));

    assert!(editor.replicate_buffer(BufferKind::Row, 0, 2).unwrap());
    assert_eq!(editor.cells().rows(), &[0.0, 40.0, 80.0, 120.0]);
    // One copy per offset even though the wire spans two linked cells.
    assert_eq!(editor.scene().wires().count(), 3);

    let (_, copy) = editor.scene().wires().nth(1).unwrap();
    assert_eq!(copy.p0, Point::new(20.0, 60.0));
    assert_eq!(copy.p1, Point::new(60.0, 60.0));
    assert_eq!(copy.material, "M1");
    let (_, copy) = editor.scene().wires().nth(2).unwrap();
    assert_eq!(copy.p0, Point::new(20.0, 100.0));
    assert_eq!(copy.p1, Point::new(60.0, 100.0));

    let (_, contact) = editor.scene().contacts().next().unwrap();
    assert_eq!(contact.center, Point::new(20.0, 100.0));
}

#[test]
fn test_replicating_last_or_missing_buffer_is_a_no_op() {
    let mut editor = setup_editor(&[0.0, 40.0, 80.0], &[0.0, 40.0]);
    editor.add_contact("CPA", Point::new(20.0, 20.0));

    assert!(!editor.replicate_buffer(BufferKind::Column, 2, 2).unwrap());
    assert!(!editor.replicate_buffer(BufferKind::Row, 1, 2).unwrap());
    assert!(!editor.replicate_buffer(BufferKind::Row, 0, 0).unwrap());
    assert!(!editor
        .replicate_buffer(BufferKind::Column, 0, usize::MAX)
        .unwrap());
    assert!(!editor
        .replicate_buffer(BufferKind::Column, 0, MAX_REPLICATION_FACTOR + 1)
        .unwrap());
    assert_eq!(editor.cells().columns(), &[0.0, 40.0, 80.0]);
    assert_eq!(editor.scene().len(), 1);
}
