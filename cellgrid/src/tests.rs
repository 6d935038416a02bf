use crate::config::EditorConfig;
use crate::editor::Editor;

/// Two columns by two rows of 40x40 cells, starting at the origin.
pub(crate) fn editor_2x2() -> Editor {
    Editor::with_partition(
        EditorConfig::default(),
        [0.0, 40.0, 80.0],
        [0.0, 40.0, 80.0],
    )
    .unwrap()
}
