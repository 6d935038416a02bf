use lazy_static::lazy_static;
use regex::Regex;
use subgeom::{Dir, Point, Rect};

use super::{CellSpec, ParseError, VLineDecl};
use crate::config::EditorConfig;
use crate::deps::arcstr::ArcStr;
use crate::scene::{Contact, Direction, Element, Transistor, TransistorKind, Wire};

/// A decimal number, optionally negative.
macro_rules! num {
    () => {
        r"(-?[\d.]+)"
    };
}

lazy_static! {
    static ref NAME: Regex =
        Regex::new(r"FRAG\(\s*([^)]+?)\s*\)|layout&\s*([A-Za-z0-9_]+)_::LAYOUT").expect("valid regex");
    static ref VLIN: Regex =
        Regex::new(concat!(r#"VLIN_(X|Y)\(\s*"([^"]+)"\s*,\s*"#, num!(), r"\s*\);")).expect("valid regex");
    static ref TRANSISTOR: Regex = Regex::new(concat!(
        r"W\(\s*",
        num!(),
        r"\s*\)\s*L\(\s*",
        num!(),
        r"\s*\)\s*OR\(\s*(NORTH|SOUTH|EAST|WEST)\s*\)\s*(TP|TN)\(\s*",
        num!(),
        r"\s*,\s*",
        num!(),
        r"\s*\)\s*;"
    ))
    .expect("valid regex");
    static ref CONTACT: Regex = Regex::new(concat!(
        r"OR\(\s*NORTH\s*\)\s*([A-Za-z0-9]+)\(\s*",
        num!(),
        r"\s*,\s*",
        num!(),
        r"(?:\s*,\s*",
        num!(),
        r"\s*,\s*",
        num!(),
        r")?\s*\)\s*;"
    ))
    .expect("valid regex");
    static ref WIRE: Regex = Regex::new(concat!(
        r"WIRE\(\s*([A-Za-z0-9]+)\s*,\s*(-?\d+)\s*,\s*",
        num!(),
        r"\s*,\s*",
        num!(),
        r"\s*,\s*",
        num!(),
        r"\s*,\s*",
        num!(),
        r"\s*\)\s*;"
    ))
    .expect("valid regex");
}

impl CellSpec {
    /// Reads a fragment. Coordinates are converted from steps to plane units.
    ///
    /// The cell bounds come from the lines named `{name}left`, `{name}right`,
    /// `{name}bot` and `{name}top`: the smallest `left` and `bot` values and
    /// the largest `right` and `top` values. All four must be declared.
    pub fn parse(text: &str, config: &EditorConfig) -> Result<Self, ParseError> {
        let step = config.step;
        let name: ArcStr = NAME
            .captures(text)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().into())
            .ok_or(ParseError::MissingName)?;

        let mut vlines = Vec::new();
        for caps in VLIN.captures_iter(text) {
            let axis = if &caps[1] == "X" { Dir::Horiz } else { Dir::Vert };
            vlines.push(VLineDecl {
                name: caps[2].into(),
                axis,
                value: caps[3].parse::<f64>()? * step,
            });
        }
        // Declarations are kept grouped by axis, `VLIN_X` first.
        vlines.sort_by_key(|decl| decl.axis != Dir::Horiz);
        let bounds = boundary(&name, &vlines)?;

        let mut elements: Vec<Element> = Vec::new();
        for caps in WIRE.captures_iter(text) {
            elements.push(
                Wire::new(
                    &caps[1],
                    caps[2].parse::<i64>()?,
                    point(&caps[3], &caps[4], step)?,
                    point(&caps[5], &caps[6], step)?,
                )
                .into(),
            );
        }

        // Transistor statements also match the contact pattern.
        let without_transistors = TRANSISTOR.replace_all(text, "");
        for caps in CONTACT.captures_iter(&without_transistors) {
            let mut center = point(&caps[2], &caps[3], step)?;
            // A two-point contact sits midway between its points.
            if let (Some(x), Some(y)) = (caps.get(4), caps.get(5)) {
                let far = point(x.as_str(), y.as_str(), step)?;
                center = Point::new((center.x + far.x) / 2.0, (center.y + far.y) / 2.0);
            }
            elements.push(Contact::new(&caps[1], config.contact_size, center).into());
        }

        for caps in TRANSISTOR.captures_iter(text) {
            elements.push(
                Transistor {
                    width: caps[1].parse::<f64>()?,
                    line_length: caps[2].parse::<f64>()? * step,
                    direction: caps[3].parse::<Direction>()?,
                    kind: caps[4].parse::<TransistorKind>()?,
                    loc: point(&caps[5], &caps[6], step)?,
                    body_size: step,
                }
                .into(),
            );
        }

        Ok(Self {
            name,
            bounds,
            vlines,
            elements,
        })
    }
}

fn point(x: &str, y: &str, step: f64) -> Result<Point, ParseError> {
    Ok(Point::new(x.parse::<f64>()? * step, y.parse::<f64>()? * step))
}

fn boundary(name: &str, vlines: &[VLineDecl]) -> Result<Rect, ParseError> {
    let extreme = |suffix: &str, lowest: bool| {
        let target = format!("{name}{suffix}");
        vlines
            .iter()
            .filter(|decl| decl.name == target.as_str())
            .map(|decl| decl.value)
            .reduce(if lowest { f64::min } else { f64::max })
    };

    let sides = [
        ("left", extreme("left", true)),
        ("right", extreme("right", false)),
        ("bot", extreme("bot", true)),
        ("top", extreme("top", false)),
    ];
    let missing: Vec<String> = sides
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(suffix, _)| format!("{name}{suffix}"))
        .collect();

    match sides.map(|(_, value)| value) {
        [Some(left), Some(right), Some(bot), Some(top)] => {
            if right <= left || top <= bot {
                return Err(ParseError::EmptyBounds(name.into()));
            }
            Ok(Rect::from_bounds(left, bot, right, top))
        }
        _ => Err(ParseError::MissingBoundary {
            cell: name.into(),
            missing,
        }),
    }
}
