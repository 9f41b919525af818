//! Plasma profiles: the input file named by `ext_prof_name` and the
//! `profiles.dat` / `profiles_ex.dat` tables FAR3D writes back.
//!
//! The input file has an 18-line header of labelled scalars, then one row per
//! radial point.

mod output;

pub use output::{
    OutputColumn, ProfilesOutput, PROFILES_DAT_COLUMNS, PROFILES_DAT_EXT_ALPHA_COLUMNS,
    PROFILES_DAT_EXT_COLUMNS, PROFILES_EX_ALPHA_COLUMNS, PROFILES_EX_COLUMNS,
};

use crate::error::{FarError, Result};
use crate::tokens::LineReader;
use ndarray::{Array2, ArrayView1, Axis};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Profile columns: name, units, description.
pub const PROFILE_COLUMNS: [(&str, &str, &str); 14] = [
    ("rho", "", "Normalized square root of the toroidal flux"),
    ("q", "", "Safety factor"),
    ("nnbi", "1e20 m^-3", "Density of energetic particles"),
    ("ni", "1e20 m^-3", "Thermal ion density"),
    ("ne", "1e20 m^-3", "Thermal electron density"),
    ("nimp", "1e20 m^-3", "Impurity density"),
    ("tnbi", "keV", "Temperature of the energetic particles"),
    ("ti", "keV", "Thermal ion temperature"),
    ("te", "keV", "Thermal electron temperature"),
    ("pnbi", "kPa", "Energetic particle pressure"),
    ("p", "kPa", "Total pressure"),
    ("pequil", "kPa", "Equilibrium pressure"),
    ("vtor", "km/s", "Toroidal rotation"),
    ("vpol", "km/s", "Poloidal rotation"),
];

const HEADER_LINES: usize = 18;

/// Plasma profiles and equilibrium scalars of one case.
#[derive(Debug, Clone)]
pub struct ProfilesInput {
    /// Source file.
    pub path: PathBuf,
    /// Magnetic field on axis (T).
    pub bt0: f64,
    /// Major radius of the geometric centre (m).
    pub rmajr: f64,
    /// Minor radius (m).
    pub rminr: f64,
    /// Average elongation.
    pub kappa: f64,
    /// Average triangularity.
    pub delta: f64,
    /// Main contaminant species.
    pub main_impurity: String,
    /// Main ion mass over proton mass.
    pub mi_mp: f64,
    /// Beta on axis.
    pub beta0: f64,
    /// Outer major radius (m).
    pub rmax: f64,
    /// Inverse aspect ratio `rminr / rmajr`.
    pub eps: f64,
    /// `(radial point, column)` in [`PROFILE_COLUMNS`] order.
    pub data: Array2<f64>,
}

fn scalar<R: BufRead>(reader: &mut LineReader<R>, name: &str) -> Result<f64> {
    reader.skip_lines(1, name)?;
    reader.parse_line(name, "a float")
}

fn labelled(part: &str, name: &str, line: usize) -> Result<f64> {
    let token = part.trim();
    token
        .parse()
        .map_err(|_| FarError::parse(name, line, token, "a float"))
}

impl ProfilesInput {
    /// Read a profile file written for the given unit and species switches.
    pub fn read(path: &Path, diiid_u: i64, alpha_on: i64) -> Result<Self> {
        if diiid_u != 0 || alpha_on != 0 {
            return Err(FarError::NotImplemented(
                "profiles with DIIID_u or alpha_on set",
            ));
        }
        let file = File::open(path).map_err(|e| FarError::file_open(path, e))?;
        let mut reader = LineReader::new(BufReader::new(file));
        Self::decode(&mut reader, path)
    }

    /// Decode from a line stream.
    pub fn decode<R: BufRead>(reader: &mut LineReader<R>, path: &Path) -> Result<Self> {
        reader.skip_lines(1, "profiles title")?;
        let bt0 = scalar(reader, "bt0")?;
        let rmajr = scalar(reader, "rmajr")?;
        let rminr = scalar(reader, "rminr")?;
        let kappa = scalar(reader, "kappa")?;
        let delta = scalar(reader, "delta")?;
        reader.skip_lines(1, "main impurity")?;
        let main_impurity = reader.expect_line("main impurity")?.trim().to_string();
        let mi_mp = scalar(reader, "mi_mp")?;

        // `beta0 = x, Rmax = y`
        let line = reader.expect_line("beta0")?.to_string();
        let parts: Vec<&str> = line.split('=').collect();
        if parts.len() != 3 {
            let line_number = reader.line_number();
            return Err(FarError::parse(
                "beta0",
                line_number,
                line.trim(),
                "'beta0 = x, Rmax = y'",
            ));
        }
        let line_number = reader.line_number();
        let beta0 = labelled(parts[1].split(',').next().unwrap_or(""), "beta0", line_number)?;
        let rmax = labelled(parts[2], "Rmax", line_number)?;
        reader.skip_lines(HEADER_LINES.saturating_sub(reader.line_number()), "profiles header")?;

        let mut values = Vec::new();
        let mut rows = 0;
        while let Some(line) = reader.next_line()? {
            let line = line.to_string();
            if line.trim().is_empty() {
                continue;
            }
            let mut count = 0;
            for token in line.split_whitespace() {
                values.push(token.parse::<f64>().map_err(|_| {
                    FarError::parse("profiles", reader.line_number(), token, "a float")
                })?);
                count += 1;
            }
            if count != PROFILE_COLUMNS.len() {
                return Err(FarError::ColumnMismatch {
                    context: format!("{} line {}", path.display(), reader.line_number()),
                    expected: PROFILE_COLUMNS.len(),
                    found: count,
                });
            }
            rows += 1;
        }
        let data = Array2::from_shape_vec((rows, PROFILE_COLUMNS.len()), values)?;

        Ok(Self {
            path: path.to_path_buf(),
            bt0,
            rmajr,
            rminr,
            kappa,
            delta,
            main_impurity,
            mi_mp,
            beta0,
            rmax,
            eps: rminr / rmajr,
            data,
        })
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let index = PROFILE_COLUMNS.iter().position(|(column, _, _)| *column == name)?;
        Some(self.data.index_axis(Axis(1), index))
    }

    /// Value of a column on the magnetic axis (`rho == 0`).
    pub fn value_at_axis(&self, name: &str) -> Result<f64> {
        let column = self.column(name).ok_or_else(|| {
            FarError::ShapeMismatch(format!("no profile column named '{}'", name))
        })?;
        let rho = self.data.index_axis(Axis(1), 0);
        rho.iter()
            .position(|&r| r == 0.0)
            .map(|index| column[index])
            .ok_or_else(|| {
                FarError::ShapeMismatch(format!("{} has no rho = 0 point", self.path.display()))
            })
    }

    /// Number of radial points.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// Whether the file held no radial points.
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    /// A two-point profile file with `bt0 = 2`, `rmajr = 1.5`, `mi_mp = 2` and `ni(0) = 0.4`.
    pub(crate) fn profile_text() -> String {
        let mut text = String::from(
            "Profiles for FAR3D\n\
             Magnetic field (T)\n2.0\n\
             Major radius (m)\n1.5\n\
             Minor radius (m)\n0.5\n\
             Elongation\n1.6\n\
             Triangularity\n0.3\n\
             Main impurity\nCarbon\n\
             mi/mp\n2.0\n\
             beta0 = 0.012, Rmax = 2.1\n\
             \n\
             rho q nnbi ni ne nimp tnbi ti te pnbi p pequil vtor vpol\n",
        );
        for (rho, ni) in [(0.0, 0.4), (1.0, 0.1)] {
            let mut row = vec![rho, 1.0 + rho, 0.01, ni, ni + 0.02, 0.01];
            row.extend([50.0, 2.0, 2.5, 10.0, 20.0, 19.0, 30.0, 1.0]);
            let line: Vec<String> = row.iter().map(|v| format!("{:.6e}", v)).collect();
            text.push_str(&line.join("  "));
            text.push('\n');
        }
        text
    }
}
