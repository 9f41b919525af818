//! Per-run mode amplitude tables (`<variable>_<run>` files).

use super::header::{extract_modes, Dialect, ModeSet};
use crate::config::ReaderConfig;
use crate::error::{FarError, Result};
use crate::tokens::LineReader;
use ndarray::{s, Array1, Array3, Array5, ArrayView1};
use num_complex::Complex64;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A whitespace-separated numeric table with a one-line header.
#[derive(Debug, Clone)]
pub struct ModeTable {
    /// Header line, verbatim.
    pub header: String,
    /// Data rows.
    pub rows: Vec<Vec<f64>>,
}

impl ModeTable {
    /// Read a table file. Every row must be as wide as the first.
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| FarError::file_open(path, e))?;
        let mut reader = LineReader::new(BufReader::new(file));
        let context = path.display().to_string();
        let header = reader.expect_line(&context)?.to_string();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        while let Some(line) = reader.next_line()? {
            let line = line.to_string();
            if line.trim().is_empty() {
                continue;
            }
            let mut row = Vec::new();
            for token in line.split_whitespace() {
                let value = token.parse::<f64>().map_err(|_| {
                    FarError::parse(context.as_str(), reader.line_number(), token, "a float")
                })?;
                row.push(value);
            }
            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(FarError::ColumnMismatch {
                        context: format!("{} line {}", context, reader.line_number()),
                        expected: first.len(),
                        found: row.len(),
                    });
                }
            }
            rows.push(row);
        }
        Ok(Self { header, rows })
    }

    /// Width of the data rows (0 when the table is empty).
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// Sorted run identifiers of the files starting with `variable`.
pub fn list_runs(dir: &Path, variable: &str) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map_err(|e| FarError::file_open(dir, e))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(variable))
        .collect();
    names.sort();
    let runs: Vec<String> = names
        .iter()
        .filter_map(|name| name.split('_').nth(1).map(str::to_string))
        .collect();
    if runs.is_empty() {
        return Err(FarError::MissingFile {
            path: dir.join(format!("{}_*", variable)),
        });
    }
    Ok(runs)
}

/// Mode amplitudes of every run in a case directory.
#[derive(Debug, Clone)]
pub struct ModeAmplitudes {
    /// Case directory.
    pub path: PathBuf,
    /// Run identifiers, sorted.
    pub runs: Vec<String>,
    /// Mode numbers shared by every table.
    pub modes: ModeSet,
    /// Radial coordinate of the first table.
    pub r: Array1<f64>,
    /// `(run, n, m, component, r)` per variable; component 0 real, 1 imaginary.
    pub data: BTreeMap<String, Array5<f64>>,
    /// `(run, n, m)` per energy variable.
    pub energy: BTreeMap<String, Array3<f64>>,
    /// Time of each run, from the first energy variable found. NaN when none was.
    pub time: Array1<f64>,
}

impl ModeAmplitudes {
    /// Read every configured variable for every run.
    pub fn read(dir: &Path, config: &ReaderConfig) -> Result<Self> {
        let header_variable = config.mode_header_variable.as_str();
        let runs = list_runs(dir, header_variable)?;
        info!("Found {} runs in {}", runs.len(), dir.display());

        let first = ModeTable::read(&dir.join(format!("{}_{}", header_variable, runs[0])))?;
        let modes = ModeSet::from_header(&first.header, first.column_count())?;
        let nr = first.rows.len();
        let r: Array1<f64> = first.rows.iter().map(|row| row[0]).collect();

        let mut data = BTreeMap::new();
        for variable in &config.mode_variables {
            if !dir.join(format!("{}_{}", variable, runs[0])).is_file() {
                warn!("No files found for {}", variable);
                continue;
            }
            info!("Reading {}", variable);
            let mut values = Array5::from_elem(
                (runs.len(), modes.unique_n.len(), modes.unique_m.len(), 2, nr),
                f64::NAN,
            );
            for (run_index, run) in runs.iter().enumerate() {
                let path = dir.join(format!("{}_{}", variable, run));
                let table = ModeTable::read(&path)?;
                if table.column_count() != modes.column_count() {
                    return Err(FarError::ColumnMismatch {
                        context: path.display().to_string(),
                        expected: modes.column_count(),
                        found: table.column_count(),
                    });
                }
                if table.rows.len() != nr {
                    return Err(FarError::ShapeMismatch(format!(
                        "{} has {} radial points, expected {}",
                        path.display(),
                        table.rows.len(),
                        nr
                    )));
                }
                for (column, &(ni, mi)) in modes.grid_index.iter().enumerate() {
                    for (ir, row) in table.rows.iter().enumerate() {
                        values[[run_index, ni, mi, 0, ir]] = row[column + 1];
                        values[[run_index, ni, mi, 1, ir]] = row[column + 1 + modes.len()];
                    }
                }
            }
            data.insert(variable.clone(), values);
        }

        let (energy, time) = read_energies(dir, &runs, &modes, config)?;

        Ok(Self {
            path: dir.to_path_buf(),
            runs,
            modes,
            r,
            data,
            energy,
            time,
        })
    }

    /// Energy of one harmonic in every run.
    pub fn energy_history(&self, variable: &str, n: i32, m: i32) -> Option<Array1<f64>> {
        let values = self.energy.get(variable)?;
        let ni = self.modes.unique_n.binary_search(&n).ok()?;
        let mi = self.modes.unique_m.binary_search(&m).ok()?;
        Some(values.slice(s![.., ni, mi]).to_owned())
    }

    /// Names of the loaded variables.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    /// Radial profile of one harmonic as complex amplitudes.
    pub fn profile(&self, variable: &str, run: &str, n: i32, m: i32) -> Option<Vec<Complex64>> {
        let values = self.data.get(variable)?;
        let run_index = self.runs.iter().position(|id| id == run)?;
        let ni = self.modes.unique_n.binary_search(&n).ok()?;
        let mi = self.modes.unique_m.binary_search(&m).ok()?;
        let re: ArrayView1<'_, f64> = values.slice(s![run_index, ni, mi, 0, ..]);
        let im: ArrayView1<'_, f64> = values.slice(s![run_index, ni, mi, 1, ..]);
        Some(
            re.iter()
                .zip(im.iter())
                .map(|(&re, &im)| Complex64::new(re, im))
                .collect(),
        )
    }

    /// Peak modulus of one harmonic over radius and runs, NaN entries ignored.
    pub fn peak_amplitude(&self, variable: &str, n: i32, m: i32) -> Option<f64> {
        self.runs
            .iter()
            .filter_map(|run| self.profile(variable, run, n, m))
            .flatten()
            .map(|value| value.norm())
            .filter(|value| !value.is_nan())
            .reduce(f64::max)
    }
}

/// Per-mode energies: one header and one row per `<variable>_<run>` file.
fn read_energies(
    dir: &Path,
    runs: &[String],
    modes: &ModeSet,
    config: &ReaderConfig,
) -> Result<(BTreeMap<String, Array3<f64>>, Array1<f64>)> {
    let mut energy = BTreeMap::new();
    let mut time = Array1::from_elem(runs.len(), f64::NAN);
    for variable in &config.energy_variables {
        if !dir.join(format!("{}_{}", variable, runs[0])).is_file() {
            warn!("No files found for {}", variable);
            continue;
        }
        info!("Reading {}", variable);
        // Column 0 is time; `nc` rows start their modes at 1, the others at 3.
        let offset = if variable.ends_with("nc") { 1 } else { 3 };
        let fill_time = energy.is_empty();
        let mut values = Array3::from_elem(
            (runs.len(), modes.unique_n.len(), modes.unique_m.len()),
            f64::NAN,
        );
        for (run_index, run) in runs.iter().enumerate() {
            let path = dir.join(format!("{}_{}", variable, run));
            let table = ModeTable::read(&path)?;
            let tokens: Vec<&str> = table.header.split_whitespace().collect();
            let (m, n) = extract_modes(&tokens, Dialect::Legacy)?;
            let energy_modes = ModeSet::from_lists(Dialect::Legacy, m, n);
            if energy_modes.unique_n != modes.unique_n || energy_modes.unique_m != modes.unique_m {
                return Err(FarError::ShapeMismatch(format!(
                    "{} lists n={:?} m={:?}, amplitudes have n={:?} m={:?}",
                    path.display(),
                    energy_modes.unique_n,
                    energy_modes.unique_m,
                    modes.unique_n,
                    modes.unique_m
                )));
            }
            let row = table
                .rows
                .first()
                .ok_or_else(|| FarError::eof(path.display().to_string(), 2))?;
            let expected = offset + energy_modes.len();
            if row.len() < expected {
                return Err(FarError::ColumnMismatch {
                    context: path.display().to_string(),
                    expected,
                    found: row.len(),
                });
            }
            if fill_time {
                time[run_index] = row[0];
            }
            for (column, &(ni, mi)) in energy_modes.grid_index.iter().enumerate() {
                values[[run_index, ni, mi]] = row[offset + column];
            }
        }
        energy.insert(variable.clone(), values);
    }
    Ok((energy, time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "  r   1/ 1   2/ 1  -1/ 1  -2/ 1\n";

    fn write_table(dir: &Path, name: &str, scale: f64) {
        let mut text = String::from(HEADER);
        for ir in 0..3 {
            let r = ir as f64 / 2.0;
            text.push_str(&format!(
                "{} {} {} {} {}\n",
                r,
                scale * r,
                2.0 * scale * r,
                -scale,
                -2.0 * scale
            ));
        }
        fs::write(dir.join(name), text).unwrap();
    }

    fn config(variables: &[&str]) -> ReaderConfig {
        ReaderConfig {
            mode_variables: variables.iter().map(|v| v.to_string()).collect(),
            ..ReaderConfig::default()
        }
    }

    const ENERGY_HEADER: &str = "  time   1/ 1   2/ 1\n";

    fn write_energy(dir: &Path, name: &str, row: &str) {
        fs::write(dir.join(name), format!("{}{}\n", ENERGY_HEADER, row)).unwrap();
    }

    #[test]
    fn reads_runs_and_places_columns() {
        let dir = TempDir::new().unwrap();
        for run in ["0001", "0000"] {
            write_table(dir.path(), &format!("psi_{}", run), 1.0);
            write_table(dir.path(), &format!("phi_{}", run), 10.0);
        }
        let amps = ModeAmplitudes::read(dir.path(), &config(&["psi", "phi", "br"])).unwrap();
        assert_eq!(amps.runs, vec!["0000", "0001"]);
        assert_eq!(amps.variables().collect::<Vec<_>>(), vec!["phi", "psi"]);
        assert_eq!(amps.r.to_vec(), vec![0.0, 0.5, 1.0]);

        let phi = &amps.data["phi"];
        assert_eq!(phi.shape(), &[2, 1, 2, 2, 3]);
        assert_eq!(phi[[1, 0, 1, 0, 2]], 20.0);
        assert_eq!(phi[[1, 0, 1, 1, 2]], -20.0);

        let profile = amps.profile("psi", "0000", 1, 2).unwrap();
        assert_eq!(profile[1], Complex64::new(1.0, -2.0));
        let peak = amps.peak_amplitude("psi", 1, 1).unwrap();
        assert!((peak - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn narrow_table_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("psi_0000"), format!("{}0 1 2 3\n", HEADER)).unwrap();
        let err = ModeAmplitudes::read(dir.path(), &config(&["psi"])).unwrap_err();
        assert!(matches!(err, FarError::ColumnMismatch { expected: 5, found: 4, .. }));
    }

    #[test]
    fn no_runs_is_a_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = ModeAmplitudes::read(dir.path(), &ReaderConfig::default()).unwrap_err();
        assert!(err.is_missing_file());
    }

    #[test]
    fn energies_fill_run_grids_and_time() {
        let dir = TempDir::new().unwrap();
        for (run, t) in [("0000", 1.5), ("0001", 2.5)] {
            write_table(dir.path(), &format!("psi_{}", run), 1.0);
            write_energy(dir.path(), &format!("ekenc_{}", run), &format!("{} 0.1 0.2", t));
            write_energy(dir.path(), &format!("eke_{}", run), &format!("{} 9 9 0.3 0.4", t + 10.0));
        }
        let amps = ModeAmplitudes::read(dir.path(), &config(&["psi"])).unwrap();
        assert_eq!(amps.energy.keys().collect::<Vec<_>>(), vec!["eke", "ekenc"]);
        assert_eq!(amps.time.to_vec(), vec![1.5, 2.5]);

        let ekenc = &amps.energy["ekenc"];
        assert_eq!(ekenc.shape(), &[2, 1, 2]);
        assert_eq!(ekenc[[1, 0, 1]], 0.2);
        assert_eq!(amps.energy_history("eke", 1, 1).unwrap().to_vec(), vec![0.3, 0.3]);
        assert_eq!(amps.energy_history("eke", 1, 2).unwrap()[1], 0.4);
        assert!(amps.energy_history("eme", 1, 1).is_none());
    }

    #[test]
    fn energy_modes_must_match_amplitudes() {
        let dir = TempDir::new().unwrap();
        write_table(dir.path(), "psi_0000", 1.0);
        fs::write(dir.path().join("ekenc_0000"), "  time   1/ 1   3/ 1\n1.0 0.1 0.2\n").unwrap();
        let err = ModeAmplitudes::read(dir.path(), &config(&["psi"])).unwrap_err();
        assert!(matches!(err, FarError::ShapeMismatch(_)));
    }

    #[test]
    fn short_energy_row_is_rejected() {
        let dir = TempDir::new().unwrap();
        write_table(dir.path(), "psi_0000", 1.0);
        write_energy(dir.path(), "eme_0000", "1.0 0.0 0.0 0.5");
        let err = ModeAmplitudes::read(dir.path(), &config(&["psi"])).unwrap_err();
        assert!(matches!(err, FarError::ColumnMismatch { expected: 5, found: 4, .. }));
    }
}
