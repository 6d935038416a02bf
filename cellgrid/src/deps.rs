//! Re-exports of crates that appear in this crate's public API.

pub use arcstr;
pub use subgeom;
