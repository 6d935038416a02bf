#![allow(dead_code)]

use std::path::PathBuf;

use cellgrid::config::EditorConfig;
use cellgrid::editor::Editor;

pub const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/tests");

/// Returns the path to the editor config TOML file with the given name.
pub fn config_path(name: &str) -> PathBuf {
    PathBuf::from(DATA_DIR).join(format!("{name}.toml"))
}

/// Returns the path to the `LAYOUT()` fragment with the given name.
pub fn fragment_path(name: &str) -> PathBuf {
    PathBuf::from(DATA_DIR).join(format!("fragments/{name}.cpp"))
}

pub fn setup_editor(columns: &[f64], rows: &[f64]) -> Editor {
    Editor::with_partition(
        EditorConfig::default(),
        columns.iter().copied(),
        rows.iter().copied(),
    )
    .unwrap()
}
