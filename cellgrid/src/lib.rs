//! A grid/cell partition engine for mask-layout editing.
//!
//! The plane is divided into named rectangular cells by ordered column and
//! row coordinates. Wires, contacts and transistors placed in a [`scene::Scene`]
//! are indexed into the cells that contain them, and "virtual lines" are
//! derived wherever geometry touches a cell boundary.
//!
//! [`editor::Editor`] ties the pieces together and sequences every edit into
//! a consistent rebuild of cells, membership, virtual lines and buffers.

pub mod buffer;
pub mod cif;
pub mod config;
pub mod deps;
pub mod editor;
pub mod error;
pub mod partition;
pub mod scene;
pub mod spec;
pub mod vlines;

pub(crate) mod log;

#[cfg(test)]
pub(crate) mod tests;
