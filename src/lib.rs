//! Farscan - a decoder for FAR3D plasma-stability output.
//!
//! FAR3D writes fixed-layout Fortran text: a positional input namelist, an
//! eigensolver dump, a free-form solver log and one table per mode variable
//! and run. Farscan reads these into `ndarray` grids indexed by toroidal `n`,
//! poloidal `m` and radius, and aggregates parameter scans laid out as
//! `<name>_<value>` directory trees.
//!
//! # Features
//!
//! - Namelist decoding and re-encoding against a fixed schema
//! - Eigenvalue filtering and complex eigenvector reconstruction
//! - Growth-rate tables with convergence checks
//! - Energy history of each harmonic, from the log and the per-mode files
//! - Input profiles and the profile tables FAR3D writes back
//! - 1-D and 2-D scans with conversion of frequencies to kHz
//! - NetCDF export of scan growth rates
//!
//! # Example
//!
//! ```ignore
//! use farscan::{ReaderConfig, scan::Scan};
//! use std::path::Path;
//!
//! let mut scan = Scan::discover_1d(Path::new("runs"), None, ReaderConfig::default())?;
//! scan.read_profiles(false)?;
//! scan.read_eigensolver(false)?;
//! let factor = scan.renormalize_eigen_frequencies(false)?;
//! println!("{} cells, {} kHz per code unit", scan.cells().len(), factor);
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod config;
pub mod eigen;
pub mod error;
pub mod farprt;
pub mod modes;
pub mod namelist;
pub mod profiles;
pub mod report;
pub mod scan;
pub mod tokens;

pub use config::{MissingCellPolicy, ReaderConfig};
pub use error::{FarError, Result};
