use cellgrid::config::EditorConfig;
use cellgrid::editor::Editor;
use cellgrid::error::{ErrorContext, ErrorSource};
use common::config_path;
use subgeom::Point;

mod common;

#[test]
fn test_config_from_toml_file() {
    let config = EditorConfig::from_toml_file(config_path("coarse")).unwrap();
    assert_eq!(config.cell_size, 40.0);
    assert_eq!(config.step, 80.0);
    assert_eq!(config.edge_tolerance, 4.0);
    assert_eq!(config.default_wire_material, "M1");
    // Unspecified fields keep their defaults.
    assert_eq!(config.dedup_tolerance, 1.0);
    assert_eq!(config.contact_size, 10.0);
}

#[test]
fn test_invalid_config_file() {
    let err = EditorConfig::from_toml_file(config_path("invalid")).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::InvalidArgs(_)));
    assert!(matches!(err.context(), [ErrorContext::ReadFile(_)]));

    let err = EditorConfig::from_toml("cell_size = \"wide\"").unwrap_err();
    assert!(matches!(err.source(), ErrorSource::TomlParsing(_)));
}

#[test]
fn test_builder_validation() {
    assert!(EditorConfig::builder().step(-1.0).build().is_err());
    let config = EditorConfig::builder()
        .cell_size(10.0)
        .default_contact_material("VIA1")
        .build()
        .unwrap();
    assert_eq!(config.step, 40.0);
    assert_eq!(config.default_contact_material, "VIA1");
}

#[test]
fn test_editor_snaps_to_configured_grid() {
    let config = EditorConfig::from_toml_file(config_path("coarse")).unwrap();
    let mut editor = Editor::with_partition(config, [0.0, 79.0], [0.0, 81.0]).unwrap();
    assert_eq!(editor.cells().columns(), &[0.0, 80.0]);

    let key = editor.add_contact("CPA", Point::new(19.0, 61.0));
    let contact = editor.scene().get(key).unwrap().as_contact().unwrap();
    assert_eq!(contact.center, Point::new(0.0, 80.0));
}

#[test]
fn test_default_elements_follow_config() {
    let config = EditorConfig::from_toml_file(config_path("coarse")).unwrap();
    let mut editor = Editor::with_partition(config, [0.0, 80.0], [0.0, 80.0]).unwrap();

    let key = editor
        .add_default_wire(Point::new(0.0, 41.0), Point::new(79.0, 41.0))
        .unwrap();
    let wire = editor.scene().get(key).unwrap().as_wire().unwrap();
    assert_eq!(wire.material, "M1");
    assert_eq!(wire.width, -3);
    assert_eq!(wire.p1, Point::new(80.0, 40.0));

    let key = editor.add_default_contact(Point::new(40.0, 40.0));
    let contact = editor.scene().get(key).unwrap().as_contact().unwrap();
    assert_eq!(contact.material, "CPA");
    assert_eq!(contact.size, 10.0);

    assert!(editor
        .add_default_wire(Point::new(0.0, 0.0), Point::new(80.0, 80.0))
        .is_err());
}

#[test]
fn test_editor_rejects_non_positive_units() {
    let config = EditorConfig {
        cell_size: 0.0,
        ..Default::default()
    };
    let err = Editor::new(config).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::InvalidArgs(_)));

    let config = EditorConfig {
        step: f64::NAN,
        ..Default::default()
    };
    assert!(Editor::with_partition(config, [0.0, 40.0], [0.0, 40.0]).is_err());
    assert!(Editor::new(EditorConfig::default()).is_ok());
}
