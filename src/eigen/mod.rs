//! Eigensolver output: `egn_values.dat` and `egn_mode_asci.dat`.
//!
//! Eigen-indices whose scaled frequency reaches the validity ceiling are
//! spurious solutions of the solver. They are dropped and the remaining
//! indices renumbered from 0 in their original order.

use crate::config::{EigenConfig, ReaderConfig};
use crate::error::{FarError, Result};
use crate::modes::{classify_header, list_runs, Dialect};
use crate::tokens::LineReader;
use ndarray::{Array1, Array3};
use num_complex::Complex64;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Original indices kept by the acceptance filter, in original order.
///
/// Index `i` is kept iff `frequencies[i] * scale^2 < ceiling`; NaN is never kept.
/// The compacted index of a kept entry is its position in the returned vector.
pub fn accepted_indices(frequencies: &[f64], scale: f64, ceiling: f64) -> Vec<usize> {
    frequencies
        .iter()
        .enumerate()
        .filter(|(_, value)| **value * scale * scale < ceiling)
        .map(|(index, _)| index)
        .collect()
}

fn open(path: &Path) -> Result<LineReader<BufReader<File>>> {
    let file = File::open(path).map_err(|e| FarError::file_open(path, e))?;
    Ok(LineReader::new(BufReader::new(file)))
}

/// Accepted frequencies and growth rates.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenValues {
    /// Mode frequency.
    pub omega: Array1<f64>,
    /// Growth rate.
    pub gamma: Array1<f64>,
}

impl EigenValues {
    /// Number of accepted eigen-indices.
    pub fn len(&self) -> usize {
        self.omega.len()
    }

    /// Whether every eigen-index was rejected.
    pub fn is_empty(&self) -> bool {
        self.omega.is_empty()
    }

    /// Accepted index with the largest growth rate.
    pub fn most_unstable(&self) -> Option<usize> {
        self.gamma
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.is_nan())
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(index, _)| index)
    }
}

/// Decode `egn_values.dat`: one `frequency growth` pair per non-blank line.
pub fn decode_egn_values<R: BufRead>(
    reader: &mut LineReader<R>,
    config: &EigenConfig,
) -> Result<EigenValues> {
    let mut omega = Vec::new();
    let mut gamma = Vec::new();
    while let Some(line) = reader.next_line()? {
        let line = line.to_string();
        if line.trim().is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 2 {
            return Err(FarError::ColumnMismatch {
                context: format!("egn_values line {}", reader.line_number()),
                expected: 2,
                found: tokens.len(),
            });
        }
        let mut pair = [0.0; 2];
        for (slot, token) in pair.iter_mut().zip(&tokens) {
            *slot = token.parse().map_err(|_| {
                FarError::parse("egn_values", reader.line_number(), *token, "a float")
            })?;
        }
        omega.push(pair[0]);
        gamma.push(pair[1]);
    }
    let kept = accepted_indices(&omega, config.frequency_scale, config.validity_ceiling);
    if kept.len() < omega.len() {
        debug!(
            "Rejected {} of {} eigenvalues above the validity ceiling",
            omega.len() - kept.len(),
            omega.len()
        );
    }
    Ok(EigenValues {
        omega: kept.iter().map(|&i| omega[i]).collect(),
        gamma: kept.iter().map(|&i| gamma[i]).collect(),
    })
}

/// Read `egn_values.dat`.
pub fn read_egn_values(path: &Path, config: &EigenConfig) -> Result<EigenValues> {
    let mut reader = open(path)?;
    decode_egn_values(&mut reader, config)
}

/// Counts and mode numbers at the top of `egn_mode_asci.dat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EigenModeHeader {
    /// Eigen-indices in the file, before filtering.
    pub eigen_count: usize,
    /// Poloidal modes per eigenvector.
    pub poloidal_count: usize,
    /// Radial grid points.
    pub radial_points: usize,
    /// Poloidal number of each mode.
    pub m: Vec<i32>,
    /// Toroidal number of each mode.
    pub n: Vec<i32>,
}

/// Decode the header block of `egn_mode_asci.dat`.
pub fn decode_egn_mode_header<R: BufRead>(reader: &mut LineReader<R>) -> Result<EigenModeHeader> {
    let eigen_count: usize = reader.parse_line("egn_mode_asci mode count", "an integer")?;
    let poloidal_count: usize = reader.parse_line("egn_mode_asci poloidal count", "an integer")?;
    let radial_points: usize = reader.parse_line("egn_mode_asci radial count", "an integer")?;
    let mut m: Vec<i32> = Vec::with_capacity(poloidal_count);
    let mut n: Vec<i32> = Vec::with_capacity(poloidal_count);
    for _ in 0..poloidal_count {
        m.push(reader.parse_line("egn_mode_asci m", "an integer")?);
        n.push(reader.parse_line("egn_mode_asci n", "an integer")?);
    }
    Ok(EigenModeHeader {
        eigen_count,
        poloidal_count,
        radial_points,
        m,
        n,
    })
}

/// Eigenvectors of the accepted eigen-indices.
#[derive(Debug, Clone)]
pub struct EigenModes {
    /// File header.
    pub header: EigenModeHeader,
    /// Layout of the amplitude rows.
    pub dialect: Dialect,
    /// Scaled squared frequency of each accepted index.
    pub squared_frequency: Array1<f64>,
    /// Radial grid.
    pub rho: Array1<f64>,
    /// `(accepted, 2 * poloidal_count, radial_points)`; row `2i` real and
    /// `2i + 1` imaginary part of mode `i`.
    pub vectors: Array3<f64>,
    /// Lines after the last eigenvector block.
    pub trailing_lines: Vec<String>,
}

impl EigenModes {
    /// Number of accepted eigen-indices.
    pub fn accepted_count(&self) -> usize {
        self.vectors.shape()[0]
    }

    /// Complex amplitude of `mode` for accepted index `j` at radial point `ir`.
    pub fn amplitude(&self, j: usize, mode: usize, ir: usize) -> Option<Complex64> {
        let re = self.vectors.get([j, 2 * mode, ir])?;
        let im = self.vectors.get([j, 2 * mode + 1, ir])?;
        Some(Complex64::new(*re, *im))
    }
}

/// Decode `egn_mode_asci.dat`, one value per line.
pub fn decode_egn_modes<R: BufRead>(
    reader: &mut LineReader<R>,
    dialect: Dialect,
    config: &EigenConfig,
) -> Result<EigenModes> {
    let header = decode_egn_mode_header(reader)?;
    let mn = header.poloidal_count;
    let ns = header.radial_points;

    let mut frequencies = Vec::with_capacity(header.eigen_count);
    for _ in 0..header.eigen_count {
        frequencies.push(reader.parse_line::<f64>("egn_mode_asci frequency", "a float")?);
    }
    let scale2 = config.frequency_scale * config.frequency_scale;
    let kept = accepted_indices(&frequencies, config.frequency_scale, config.validity_ceiling);
    let mut compacted: Vec<Option<usize>> = vec![None; header.eigen_count];
    for (position, &original) in kept.iter().enumerate() {
        compacted[original] = Some(position);
    }

    let mut rho = Array1::<f64>::zeros(ns);
    for value in rho.iter_mut() {
        *value = reader.parse_line("egn_mode_asci radial grid", "a float")?;
    }

    info!("Reading {} of {} eigenvectors", kept.len(), header.eigen_count);
    let mut vectors = Array3::<f64>::zeros((kept.len(), 2 * mn, ns));
    for target in compacted.iter() {
        for ir in 0..ns {
            for mode in 0..mn {
                let re: f64 = reader.parse_line("egn_mode_asci amplitude", "a float")?;
                let im: f64 = match dialect {
                    Dialect::Legacy => 0.0,
                    Dialect::RealImag => {
                        reader.parse_line("egn_mode_asci amplitude", "a float")?
                    }
                };
                if let Some(j) = target {
                    vectors[[*j, 2 * mode, ir]] = re;
                    vectors[[*j, 2 * mode + 1, ir]] = im;
                }
            }
        }
    }
    let trailing_lines = reader.remaining_lines()?;

    Ok(EigenModes {
        header,
        dialect,
        squared_frequency: kept.iter().map(|&i| frequencies[i] * scale2).collect(),
        rho,
        vectors,
        trailing_lines,
    })
}

/// Read `egn_mode_asci.dat`.
pub fn read_egn_modes(path: &Path, dialect: Dialect, config: &EigenConfig) -> Result<EigenModes> {
    let mut reader = open(path)?;
    decode_egn_modes(&mut reader, dialect, config)
}

/// Read only the header of `egn_mode_asci.dat`.
pub fn read_egn_mode_header(path: &Path) -> Result<EigenModeHeader> {
    let mut reader = open(path)?;
    decode_egn_mode_header(&mut reader)
}

/// Detect the amplitude dialect of a case from its mode-table header, if any.
pub fn detect_dialect(case_dir: &Path, config: &ReaderConfig) -> Result<Dialect> {
    let variable = config.mode_header_variable.as_str();
    let runs = match list_runs(case_dir, variable) {
        Ok(runs) => runs,
        Err(err) if err.is_missing_file() => return Ok(Dialect::Legacy),
        Err(err) => return Err(err),
    };
    let path = case_dir.join(format!("{}_{}", variable, runs[0]));
    let mut reader = open(&path)?;
    let line = reader.expect_line("mode header")?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    Ok(classify_header(&tokens))
}

/// Units of the stored frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyUnits {
    /// Normalised code units.
    Code,
    /// Kilohertz after renormalization.
    KiloHertz,
}

/// Eigensolver results of one case.
#[derive(Debug, Clone)]
pub struct EigenSolutionSet {
    /// Case directory.
    pub path: PathBuf,
    /// Accepted frequencies and growth rates.
    pub values: EigenValues,
    /// Header of the eigenvector dump.
    pub header: EigenModeHeader,
    /// Eigenvectors, when requested.
    pub modes: Option<EigenModes>,
    /// Units of `values.omega`.
    pub units: FrequencyUnits,
}

impl EigenSolutionSet {
    /// Read a case directory.
    pub fn read(case_dir: &Path, config: &ReaderConfig, load_modes: bool) -> Result<Self> {
        let values = read_egn_values(&case_dir.join(&config.files.egn_values), &config.eigen)?;
        let modes_path = case_dir.join(&config.files.egn_modes);
        let (header, modes) = if load_modes {
            let dialect = detect_dialect(case_dir, config)?;
            let modes = read_egn_modes(&modes_path, dialect, &config.eigen)?;
            (modes.header.clone(), Some(modes))
        } else {
            (read_egn_mode_header(&modes_path)?, None)
        };
        info!(
            "Read {} eigenvalues from {}",
            values.len(),
            case_dir.display()
        );
        Ok(Self {
            path: case_dir.to_path_buf(),
            values,
            header,
            modes,
            units: FrequencyUnits::Code,
        })
    }

    /// Convert frequencies to kHz with `factor`. A second call does nothing.
    pub fn renormalize(&mut self, factor: f64) {
        if self.units == FrequencyUnits::KiloHertz {
            warn!(
                "Frequencies of {} already renormalized, skipping",
                self.path.display()
            );
            return;
        }
        self.values.omega.mapv_inplace(|omega| omega * factor);
        self.units = FrequencyUnits::KiloHertz;
    }
}
