//! Editor configuration: grid units and geometric tolerances.

use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::deps::arcstr::ArcStr;
use crate::error::{with_err_context, ErrorContext, Result};

pub const DEFAULT_CELL_SIZE: f64 = 20.0;
pub const DEFAULT_STEP: f64 = 40.0;

/// Grid units, tolerances and element defaults shared by every engine component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct EditorConfig {
    /// Snapping grid; every placement is a multiple of this.
    #[builder(default = "DEFAULT_CELL_SIZE")]
    pub cell_size: f64,
    /// The logical step. Specification text expresses coordinates in steps.
    #[builder(default = "DEFAULT_STEP")]
    pub step: f64,
    /// How far a point may sit from a cell edge and still touch it.
    #[builder(default = "2.0")]
    pub edge_tolerance: f64,
    /// Endpoint tolerance when deduplicating virtual-line candidates.
    #[builder(default = "1.0")]
    pub dedup_tolerance: f64,
    /// Tolerance when classifying a line as vertical or horizontal.
    #[builder(default = "0.1")]
    pub axis_tolerance: f64,
    /// Tolerance for exact boundary matches (buffers and replication).
    #[builder(default = "1e-6")]
    pub boundary_tolerance: f64,
    /// Depth of the auxiliary strip in which buffers are drawn.
    #[builder(default = "200.0")]
    pub buffer_strip: f64,
    #[builder(default = "arcstr::literal!(\"M2\")", setter(into))]
    pub default_wire_material: ArcStr,
    #[builder(default = "-3")]
    pub default_wire_width: i64,
    #[builder(default = "arcstr::literal!(\"CPA\")", setter(into))]
    pub default_contact_material: ArcStr,
    /// Diameter given to contacts rebuilt from specification text.
    #[builder(default = "10.0")]
    pub contact_size: f64,
    #[builder(default = "DEFAULT_STEP")]
    pub transistor_line_length: f64,
    #[builder(default = "1.0")]
    pub transistor_width: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            step: DEFAULT_STEP,
            edge_tolerance: 2.0,
            dedup_tolerance: 1.0,
            axis_tolerance: 0.1,
            boundary_tolerance: 1e-6,
            buffer_strip: 200.0,
            default_wire_material: arcstr::literal!("M2"),
            default_wire_width: -3,
            default_contact_material: arcstr::literal!("CPA"),
            contact_size: 10.0,
            transistor_line_length: DEFAULT_STEP,
            transistor_width: 1.0,
        }
    }
}

impl EditorConfig {
    #[inline]
    pub fn builder() -> EditorConfigBuilder {
        EditorConfigBuilder::default()
    }

    pub fn from_toml(input: &str) -> Result<Self> {
        let value: Self = toml::from_str(input)?;
        value.check()?;
        Ok(value)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let input = with_err_context(std::fs::read_to_string(path), || {
            ErrorContext::ReadFile(path.to_path_buf())
        })?;
        with_err_context(Self::from_toml(&input), || {
            ErrorContext::ReadFile(path.to_path_buf())
        })
    }

    pub(crate) fn check(&self) -> Result<()> {
        check_units(self.cell_size, self.step)
            .map_err(|msg| crate::error::ErrorSource::InvalidArgs(msg).into())
    }
}

impl EditorConfigBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        check_units(
            self.cell_size.unwrap_or(DEFAULT_CELL_SIZE),
            self.step.unwrap_or(DEFAULT_STEP),
        )
    }
}

fn check_units(cell_size: f64, step: f64) -> std::result::Result<(), String> {
    if cell_size.is_nan() || step.is_nan() || cell_size <= 0.0 || step <= 0.0 {
        return Err(format!(
            "cell size and step must be positive (got {cell_size} and {step})"
        ));
    }
    Ok(())
}
