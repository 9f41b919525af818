//! Parameter scans.
//!
//! A scan is a directory tree with one FAR3D case per grid point:
//!
//! ```text
//! <root>/[<prefix>]<name>_<value>                    1-D
//! <root>/<name1>_<value1>/<name2>_<value2>           2-D
//! ```
//!
//! Values are written with a fixed number of decimals per axis, inferred from
//! the first folder in sorted order and reused to rebuild every case path.
//! The growth-rate grids can be exported to NetCDF.

mod axis;
mod export;
mod grid;
mod renorm;

pub use axis::{folder_entries, format_value, infer_decimals, split_folder_name, ScanAxis};
pub use grid::{CellGrid, Scan, ScanCell};
pub use renorm::{frequency_factor, MU_0, PROTON_MASS};
