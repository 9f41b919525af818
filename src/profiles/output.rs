//! Profile tables written by FAR3D (`profiles.dat`, `profiles_ex.dat`).
//!
//! One header line, then one whitespace-separated row per radial point. The
//! column layout depends on the `ext_prof` and `alpha_on` switches of the run.

use crate::error::{FarError, Result};
use crate::tokens::LineReader;
use ndarray::{Array2, ArrayView1, Axis};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Name, units and description of an output column. Unnamed columns have an
/// empty name.
pub type OutputColumn = (&'static str, &'static str, &'static str);

/// `profiles.dat` of runs without external profiles (`ext_prof = 0`).
pub const PROFILES_DAT_COLUMNS: [OutputColumn; 14] = [
    ("rho", "", "Normalized radius"),
    ("np", "", "Thermal plasma density"),
    ("te", "", "Thermal electron temperature"),
    ("nnbi", "", "Density of energetic particles"),
    ("dnnbidr", "", "Radial derivative of the energetic particle density"),
    ("vfova", "", "Energetic particle thermal velocity over the on-axis Alfven velocity"),
    ("cureq", "", "Electric current"),
    ("feq", "", "Current density"),
    ("p", "", "Pressure of the thermal particles"),
    ("iota", "", "Iota profile, no normalization"),
    ("1/D", "", "Inverse of the n=0 Jacobian, no normalization"),
    ("curvature", "", "Radial derivative of the n=0 Jacobian, no normalization"),
    ("shear", "", "Magnetic shear, no normalization"),
    ("eta", "", "Plasma resistivity"),
];

/// `profiles.dat` of runs with external profiles and one fast species.
pub const PROFILES_DAT_EXT_COLUMNS: [OutputColumn; 17] = [
    ("rho", "", "Normalized radius"),
    ("nnbi", "", "Density of energetic particles"),
    ("ne", "", "Thermal plasma electron density"),
    ("ni", "", "Thermal plasma ion density"),
    ("tnbi", "", "Energetic particle temperature"),
    ("ti", "", "Thermal ion temperature"),
    ("te", "", "Thermal electron temperature"),
    ("vfova", "", "Energetic particle thermal velocity over the on-axis Alfven velocity"),
    ("cureq", "", "Electric current"),
    ("feq", "", "Current density"),
    ("p", "", "Pressure of the thermal particles"),
    ("iota", "", "Iota profile, no normalization"),
    ("q", "", "Safety factor, no normalization"),
    ("1/D", "", "Inverse of the n=0 Jacobian, no normalization"),
    ("curvature", "", "Radial derivative of the n=0 Jacobian, no normalization"),
    ("shear", "", "Magnetic shear, no normalization"),
    ("eta", "", "Plasma resistivity"),
];

/// `profiles.dat` of runs with external profiles and two fast species.
pub const PROFILES_DAT_EXT_ALPHA_COLUMNS: [OutputColumn; 19] = [
    ("rho", "", "Normalized radius"),
    ("nnbi", "", "Density of energetic particles"),
    ("ne", "", "Thermal plasma electron density"),
    ("ni", "", "Thermal plasma ion density"),
    ("nnbi2", "", "Density of energetic particles, second species"),
    ("tnbi", "", "Energetic particle temperature"),
    ("ti", "", "Thermal ion temperature"),
    ("te", "", "Thermal electron temperature"),
    ("tnbi2", "", "Energetic particle temperature, second species"),
    ("vfova", "", "Energetic particle thermal velocity over the on-axis Alfven velocity"),
    ("cureq", "", "Electric current"),
    ("feq", "", "Current density"),
    ("p", "", "Pressure of the thermal particles"),
    ("iota", "", "Iota profile, no normalization"),
    ("q", "", "Safety factor, no normalization"),
    ("1/D", "", "Inverse of the n=0 Jacobian, no normalization"),
    ("curvature", "", "Radial derivative of the n=0 Jacobian, no normalization"),
    ("shear", "", "Magnetic shear, no normalization"),
    ("eta", "", "Plasma resistivity"),
];

/// `profiles_ex.dat` with one fast species.
pub const PROFILES_EX_COLUMNS: [OutputColumn; 11] = [
    ("rho", "", "Normalized minor radius"),
    ("nnbi", "", "Density of energetic particles"),
    ("ne", "", "Thermal plasma electron density"),
    ("ni", "", "Thermal plasma ion density"),
    ("tnbi", "keV", "Temperature of the energetic particles"),
    ("ti", "keV", "Thermal ion temperature"),
    ("te", "keV", "Thermal electron temperature"),
    ("vztor", "m/s", "Plasma toroidal rotation"),
    ("", "", ""),
    ("vtor", "m/s", "Thermal ion velocity"),
    ("eta", "", "Plasma resistivity"),
];

/// `profiles_ex.dat` with two fast species.
pub const PROFILES_EX_ALPHA_COLUMNS: [OutputColumn; 13] = [
    ("rho", "", "Normalized minor radius"),
    ("nnbi", "", "Density of energetic particles"),
    ("ne", "", "Thermal plasma electron density"),
    ("ni", "", "Thermal plasma ion density"),
    ("nnbi2", "", "Density of energetic particles, second species"),
    ("tnbi", "keV", "Temperature of the energetic particles"),
    ("ti", "keV", "Thermal ion temperature"),
    ("te", "keV", "Thermal electron temperature"),
    ("tnbi2", "keV", "Temperature of the energetic particles, second species"),
    ("vztor", "m/s", "Plasma toroidal rotation"),
    ("", "", ""),
    ("vtor", "m/s", "Thermal ion velocity"),
    ("eta", "", "Plasma resistivity"),
];

/// A profile table written by FAR3D.
#[derive(Debug, Clone)]
pub struct ProfilesOutput {
    /// Source file.
    pub path: PathBuf,
    /// Layout the table was read with.
    pub columns: &'static [OutputColumn],
    /// `(radial point, column)` in `columns` order.
    pub data: Array2<f64>,
}

impl ProfilesOutput {
    /// Read `profiles.dat` for the given `ext_prof` and `alpha_on` switches.
    pub fn read(path: &Path, ext_prof: i64, alpha_on: i64) -> Result<Self> {
        let columns: &'static [OutputColumn] = match (ext_prof, alpha_on) {
            (0, 0 | 1) => &PROFILES_DAT_COLUMNS,
            (1, 0) => &PROFILES_DAT_EXT_COLUMNS,
            (1, 1) => &PROFILES_DAT_EXT_ALPHA_COLUMNS,
            _ => {
                return Err(FarError::NotImplemented(
                    "profiles.dat with ext_prof or alpha_on outside 0 and 1",
                ))
            }
        };
        Self::open(path, columns)
    }

    /// Read `profiles_ex.dat` for the given `alpha_on` switch.
    pub fn read_ex(path: &Path, alpha_on: i64) -> Result<Self> {
        let columns: &'static [OutputColumn] = match alpha_on {
            0 => &PROFILES_EX_COLUMNS,
            1 => &PROFILES_EX_ALPHA_COLUMNS,
            _ => {
                return Err(FarError::NotImplemented(
                    "profiles_ex.dat with alpha_on outside 0 and 1",
                ))
            }
        };
        Self::open(path, columns)
    }

    fn open(path: &Path, columns: &'static [OutputColumn]) -> Result<Self> {
        let file = File::open(path).map_err(|e| FarError::file_open(path, e))?;
        let mut reader = LineReader::new(BufReader::new(file));
        Self::decode(&mut reader, path, columns)
    }

    /// Decode a table with a known layout from a line stream.
    pub fn decode<R: BufRead>(
        reader: &mut LineReader<R>,
        path: &Path,
        columns: &'static [OutputColumn],
    ) -> Result<Self> {
        reader.skip_lines(1, "profiles header")?;
        let mut values = Vec::new();
        let mut rows = 0;
        while let Some(line) = reader.next_line()? {
            let line = line.to_string();
            if line.trim().is_empty() {
                continue;
            }
            let before = values.len();
            for token in line.split_whitespace() {
                values.push(token.parse::<f64>().map_err(|_| {
                    FarError::parse("profiles", reader.line_number(), token, "a float")
                })?);
            }
            let found = values.len() - before;
            if found != columns.len() {
                return Err(FarError::ColumnMismatch {
                    context: format!("{} line {}", path.display(), reader.line_number()),
                    expected: columns.len(),
                    found,
                });
            }
            rows += 1;
        }
        let data = Array2::from_shape_vec((rows, columns.len()), values)?;
        Ok(Self {
            path: path.to_path_buf(),
            columns,
            data,
        })
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        if name.is_empty() {
            return None;
        }
        let index = self.columns.iter().position(|(column, _, _)| *column == name)?;
        Some(self.data.index_axis(Axis(1), index))
    }

    /// Number of radial points.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Whether the table held no radial points.
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }
}
