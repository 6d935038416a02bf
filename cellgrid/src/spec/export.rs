use std::fmt::Write;

use crate::config::EditorConfig;
use crate::partition::Cell;
use crate::scene::{Element, Scene};

/// Writes `cell` and the elements anchored in it as a `LAYOUT()` fragment.
///
/// Coordinates are relative to the cell's lower-left corner and expressed in
/// steps with two decimals, so [`CellSpec::parse`](super::CellSpec::parse)
/// reads the output back at the step resolution.
pub fn export_layout(cell: &Cell, scene: &Scene, config: &EditorConfig) -> String {
    let name = cell.name();
    let rect = cell.rect();
    let step = config.step;
    let rel = |x: f64, y: f64| ((x - rect.left()) / step, (y - rect.bottom()) / step);

    let mut transistors = Vec::new();
    let mut contacts = Vec::new();
    let mut wires = Vec::new();
    for (_, element) in scene.elements().filter(|(_, e)| e.is_anchored_in(&rect)) {
        match element {
            Element::Transistor(t) => {
                let (x, y) = rel(t.loc.x, t.loc.y);
                transistors.push(format!(
                    "W({:.2}) L({:.2}) OR({}) {}({:.2}, {:.2});",
                    t.width,
                    t.line_length / step,
                    t.direction,
                    t.kind,
                    x,
                    y
                ));
            }
            Element::Contact(c) => {
                let (x, y) = rel(c.center.x, c.center.y);
                contacts.push(format!("OR(NORTH) {}({:.2}, {:.2});", c.material, x, y));
            }
            Element::Wire(w) => {
                let (x1, y1) = rel(w.p0.x, w.p0.y);
                let (x2, y2) = rel(w.p1.x, w.p1.y);
                wires.push(format!(
                    "WIRE({}, {}, {:.2}, {:.2}, {:.2}, {:.2});",
                    w.material, w.width, x1, y1, x2, y2
                ));
            }
        }
    }

    let width = rect.width() / step;
    let height = rect.height() / step;

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "#include \"stdafx.h\"");
    let _ = writeln!(out, "#include \"{name}.h\"");
    let _ = writeln!(out);
    let _ = writeln!(out, "layout& {name}_::LAYOUT()");
    let _ = writeln!(out, "{{");
    let _ = writeln!(out, "FRAG({name})");
    let _ = writeln!(out, "// Virtual lines");
    for (axis, suffix, extent) in [
        ("Y", "top", height),
        ("Y", "bot", height),
        ("X", "left", width),
        ("X", "right", width),
    ] {
        let _ = writeln!(out, "VLIN_{axis}(\"{name}{suffix}\", 0.00);");
        let _ = writeln!(out, "VLIN_{axis}(\"{name}{suffix}\", {extent:.2});");
    }
    for (title, lines) in [
        ("Transistors", transistors),
        ("Contacts", contacts),
        ("Wires", wires),
    ] {
        if !lines.is_empty() {
            let _ = writeln!(out, "// {title}");
            for line in lines {
                let _ = writeln!(out, "{line}");
            }
        }
    }
    let _ = writeln!(out, "ENDF");
    let _ = writeln!(out, "return {name};");
    out.push('}');
    out
}

#[cfg(test)]
mod tests {
    use subgeom::{Point, Rect};

    use super::*;
    use crate::scene::{Contact, Direction, Transistor, TransistorKind, Wire};
    use crate::spec::CellSpec;

    #[test]
    fn test_export_relative_steps() {
        let cell = Cell::new("cell21", Rect::from_bounds(40.0, 0.0, 120.0, 40.0));
        let mut scene = Scene::new();
        scene.add(Wire::new("M2", -3, Point::new(40.0, 20.0), Point::new(160.0, 20.0)));
        scene.add(Contact::new("CPA", 10.0, Point::new(60.0, 40.0)));
        scene.add(Transistor {
            kind: TransistorKind::Tp,
            direction: Direction::South,
            loc: Point::new(80.0, 0.0),
            width: 1.0,
            line_length: 40.0,
            body_size: 40.0,
        });
        // Outside the cell.
        scene.add(Contact::new("CPA", 10.0, Point::new(0.0, 0.0)));

        let text = export_layout(&cell, &scene, &EditorConfig::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[3], "layout& cell21_::LAYOUT()");
        assert!(lines.contains(&"VLIN_X(\"cell21right\", 2.00);"));
        assert!(lines.contains(&"VLIN_Y(\"cell21top\", 1.00);"));
        assert!(lines.contains(&"W(1.00) L(1.00) OR(SOUTH) TP(1.00, 0.00);"));
        assert!(lines.contains(&"OR(NORTH) CPA(0.50, 1.00);"));
        assert!(lines.contains(&"WIRE(M2, -3, 0.00, 0.50, 3.00, 0.50);"));
        assert_eq!(text.matches("CPA(").count(), 1);
        assert!(text.ends_with("ENDF\nreturn cell21;\n}"));
    }

    #[test]
    fn test_export_then_parse() {
        let cell = Cell::new("cell11", Rect::from_bounds(0.0, 0.0, 80.0, 40.0));
        let mut scene = Scene::new();
        scene.add(Wire::new("M1", -3, Point::new(0.0, 20.0), Point::new(80.0, 20.0)));
        scene.add(Contact::new("CPA", 10.0, Point::new(40.0, 20.0)));

        let config = EditorConfig::default();
        let spec = CellSpec::parse(&export_layout(&cell, &scene, &config), &config).unwrap();
        assert_eq!(spec.name, "cell11");
        assert_eq!(spec.bounds, cell.rect());
        let exported: Vec<Element> = scene.elements().map(|(_, e)| e.clone()).collect();
        assert_eq!(spec.elements, exported);
    }
}
