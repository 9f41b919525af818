//! The FAR3D solver log (`farprt`).
//!
//! The log embeds a copy of the input namelist, an energy block per output
//! step and the final growth-rate table.

mod energy;
mod growth;

pub use energy::{parse_row, parse_step_header, EnergyBlock, EnergyRow, EnergyStep, ENERGY_HEADER};
pub use growth::{
    coefficient_of_variation, parse_growth_line, ConvergenceReport, GrowthRateBlock,
    GrowthReading, GROWTH_TAGS, GROWTH_VARIABLES,
};

use crate::config::ReaderConfig;
use crate::error::{FarError, Result};
use crate::namelist::{decode, NamelistRecord};
use crate::tokens::LineReader;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

/// A `farprt` file.
#[derive(Debug, Clone)]
pub struct FarprtReport {
    /// Log file.
    pub path: PathBuf,
    /// Line offset of the embedded namelist.
    pub namelist_offset: usize,
    /// Coefficient of variation above which a toroidal number is flagged.
    pub convergence_threshold: f64,
}

impl FarprtReport {
    /// Open a log with the offsets and thresholds of `config`.
    pub fn new(path: &Path, config: &ReaderConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            namelist_offset: config.farprt_namelist_offset,
            convergence_threshold: config.convergence_threshold,
        }
    }

    fn reader(&self) -> Result<LineReader<BufReader<File>>> {
        let file = File::open(&self.path).map_err(|e| FarError::file_open(&self.path, e))?;
        Ok(LineReader::new(BufReader::new(file)))
    }

    /// The namelist copied into the log.
    pub fn namelist(&self) -> Result<NamelistRecord> {
        decode(&mut self.reader()?, self.namelist_offset)
    }

    /// Energy rows of every output step.
    ///
    /// Logs of runs with a second fast-ion species (`alpha_on = 1`) carry
    /// extra columns that are not decoded.
    pub fn energy_block(&self) -> Result<EnergyBlock> {
        if self.namelist()?.int("alpha_on") == Some(1) {
            return Err(FarError::NotImplemented(
                "energy block with two fast-ion species",
            ));
        }
        info!("Reading energy block of {}", self.path.display());
        EnergyBlock::parse(&mut self.reader()?)
    }

    /// The growth-rate table.
    pub fn growth_rate(&self) -> Result<GrowthRateBlock> {
        GrowthRateBlock::parse(&mut self.reader()?, self.convergence_threshold)
    }
}
