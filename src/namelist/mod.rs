//! FAR3D `Input_Model` namelist.
//!
//! The file is positional: every value sits at a fixed line, preceded by one
//! label line and, at section boundaries, a few header lines. [`NAMELIST_SCHEMA`]
//! fixes that layout; the codec walks it in order.

mod codec;
mod record;
mod schema;

pub use codec::{decode, encode, read_namelist, write_namelist};
pub use record::{NamelistRecord, NamelistValue};
pub use schema::{field_index, FieldKind, FieldSpec, VectorLen, NAMELIST_SCHEMA};
