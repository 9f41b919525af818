//! NetCDF export of the scan-wide growth-rate grids.

use super::grid::Scan;
use crate::error::{FarError, Result};
use ndarray::ArrayD;
use std::path::Path;
use tracing::info;

impl Scan {
    /// Write `omega` and `gamma` with one dimension and coordinate variable
    /// per scan axis. Requires [`Scan::read_growth_rate`] first.
    pub fn export_growth_rate(&self, path: &Path) -> Result<()> {
        let (omega, gamma) = match (&self.omega, &self.gamma) {
            (Some(omega), Some(gamma)) => (omega, gamma),
            _ => {
                return Err(FarError::invalid_scan(
                    "growth rates must be read before they are exported",
                ))
            }
        };

        let mut file = netcdf::create(path)?;
        file.add_attribute("scan_root", self.root.display().to_string().as_str())?;

        let names: Vec<&str> = self.axes.iter().map(|axis| axis.name.as_str()).collect();
        for axis in &self.axes {
            file.add_dimension(&axis.name, axis.values.len())?;
            let mut coordinate = file.add_variable::<f64>(&axis.name, &[axis.name.as_str()])?;
            coordinate.put_values(&axis.values, ..)?;
            coordinate.put_attribute("decimals", axis.decimals as i32)?;
        }

        write_grid(&mut file, "omega", "Mean mode frequency", omega, &names)?;
        write_grid(&mut file, "gamma", "Mean mode growth rate", gamma, &names)?;
        info!("Exported growth rates of {} cells to {}", omega.len(), path.display());
        Ok(())
    }
}

fn write_grid(
    file: &mut netcdf::FileMut,
    name: &str,
    long_name: &str,
    grid: &ArrayD<f64>,
    dims: &[&str],
) -> Result<()> {
    let values: Vec<f64> = grid.iter().copied().collect();
    let mut variable = file.add_variable::<f64>(name, dims)?;
    variable.put_values(&values, ..)?;
    variable.put_attribute("long_name", long_name)?;
    variable.put_attribute("units", "code units")?;
    Ok(())
}
