//! Conversion of eigen frequencies from code units to kHz.

use super::grid::Scan;
use crate::error::{FarError, Result};
use crate::profiles::ProfilesInput;
use std::f64::consts::PI;
use tracing::{info, warn};

/// Vacuum permeability (N/A^2).
pub const MU_0: f64 = 1.25663706212e-6;

/// Proton mass (kg).
pub const PROTON_MASS: f64 = 1.67262192369e-27;

/// Alfvén frequency normalization in kHz:
/// `bt0 / (2 pi rmajr) / sqrt(mu0 m_p mi_mp ni(0) 1e20) / 1000`.
pub fn frequency_factor(profiles: &ProfilesInput) -> Result<f64> {
    let ni0 = profiles.value_at_axis("ni")?;
    Ok(profiles.bt0 / (2.0 * PI * profiles.rmajr)
        / (MU_0 * PROTON_MASS * profiles.mi_mp * ni0 * 1.0e20).sqrt()
        / 1000.0)
}

impl Scan {
    /// Convert every cell's eigen frequencies to kHz using the profiles of the
    /// first cell, and return the factor.
    ///
    /// All cells are assumed to share plasma parameters; per-cell factors
    /// (`complete`) are not available.
    pub fn renormalize_eigen_frequencies(&mut self, complete: bool) -> Result<f64> {
        if complete {
            return Err(FarError::NotImplemented("per-cell frequency renormalization"));
        }
        let reference = self
            .profiles
            .as_ref()
            .and_then(|grid| grid.iter().next())
            .and_then(Option::as_ref)
            .ok_or_else(|| FarError::invalid_scan("read the profiles of the first cell first"))?;
        let factor = frequency_factor(reference)?;

        let eigen = self
            .eigen
            .as_mut()
            .ok_or_else(|| FarError::invalid_scan("read the eigensolver data first"))?;
        if self.renormalized {
            warn!("Scan frequencies already renormalized, skipping");
            return Ok(factor);
        }
        info!("Renormalizing eigen frequencies by {:.6e} kHz", factor);
        for set in eigen.iter_mut().flatten() {
            set.renormalize(factor);
        }
        self.renormalized = true;
        Ok(factor)
    }
}
