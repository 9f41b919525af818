//! 1-D and 2-D scans over simulation case directories.

use super::axis::ScanAxis;
use crate::config::{MissingCellPolicy, ReaderConfig};
use crate::eigen::EigenSolutionSet;
use crate::error::{FarError, Result};
use crate::farprt::GrowthRateBlock;
use crate::modes::ModeAmplitudes;
use crate::namelist::{read_namelist, NamelistRecord};
use crate::profiles::ProfilesInput;
use crate::tokens::LineReader;
use ndarray::{ArrayD, IxDyn};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Per-cell results on the scan grid; `None` where the cell was not read.
pub type CellGrid<T> = ArrayD<Option<T>>;

/// One case of a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanCell {
    /// Grid index, one entry per axis.
    pub index: Vec<usize>,
    /// Scan variable values.
    pub values: Vec<f64>,
    /// Case directory.
    pub path: PathBuf,
}

/// A scan over one or two variables, one case directory per grid point.
#[derive(Debug)]
pub struct Scan {
    /// Root directory.
    pub root: PathBuf,
    /// Folder prefix of 1-D scans.
    pub prefix: Option<String>,
    /// Scan axes, outermost first.
    pub axes: Vec<ScanAxis>,
    /// Reader configuration.
    pub config: ReaderConfig,
    /// Input namelists.
    pub namelists: Option<CellGrid<NamelistRecord>>,
    /// Input profiles.
    pub profiles: Option<CellGrid<ProfilesInput>>,
    /// Eigensolver results.
    pub eigen: Option<CellGrid<EigenSolutionSet>>,
    /// Mode amplitudes.
    pub modes: Option<CellGrid<ModeAmplitudes>>,
    /// Growth-rate blocks of `farprt`.
    pub growth: Option<CellGrid<GrowthRateBlock>>,
    /// Mean frequency per cell, NaN where missing.
    pub omega: Option<ArrayD<f64>>,
    /// Mean growth rate per cell, NaN where missing.
    pub gamma: Option<ArrayD<f64>>,
    pub(crate) renormalized: bool,
}

impl Scan {
    fn new(root: &Path, prefix: Option<String>, axes: Vec<ScanAxis>, config: ReaderConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            prefix,
            axes,
            config,
            namelists: None,
            profiles: None,
            eigen: None,
            modes: None,
            growth: None,
            omega: None,
            gamma: None,
            renormalized: false,
        }
    }

    /// Discover a 1-D scan `<root>/[<prefix>]<name>_<value>`.
    pub fn discover_1d(root: &Path, prefix: Option<&str>, config: ReaderConfig) -> Result<Self> {
        let axis = ScanAxis::discover(root, prefix)?;
        info!(
            "1D scan over {} ({} values) in {}",
            axis.name,
            axis.len(),
            root.display()
        );
        Ok(Self::new(root, prefix.map(str::to_string), vec![axis], config))
    }

    /// Discover a 2-D scan `<root>/<name1>_<value1>/<name2>_<value2>`.
    ///
    /// The second axis is read from the first folder of the first axis.
    pub fn discover_2d(root: &Path, config: ReaderConfig) -> Result<Self> {
        let first = ScanAxis::discover(root, None)?;
        let second = ScanAxis::discover(&root.join(first.folder_name(0)), None)?;
        info!(
            "2D scan over {} x {} ({} x {}) in {}",
            first.name,
            second.name,
            first.len(),
            second.len(),
            root.display()
        );
        Ok(Self::new(root, None, vec![first, second], config))
    }

    /// Grid shape.
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().map(ScanAxis::len).collect()
    }

    /// Case directory of a grid index.
    pub fn cell_path(&self, index: &[usize]) -> PathBuf {
        let mut path = self.root.clone();
        for (level, (axis, &i)) in self.axes.iter().zip(index).enumerate() {
            let folder = axis.folder_name(i);
            match (&self.prefix, level) {
                (Some(prefix), 0) => path.push(format!("{}{}", prefix, folder)),
                _ => path.push(folder),
            }
        }
        path
    }

    /// Every grid cell in row-major order.
    pub fn cells(&self) -> Vec<ScanCell> {
        let shape = self.shape();
        let total: usize = shape.iter().product();
        (0..total)
            .map(|flat| {
                let mut index = vec![0; shape.len()];
                let mut rest = flat;
                for (slot, &size) in index.iter_mut().zip(&shape).rev() {
                    *slot = rest % size;
                    rest /= size;
                }
                let values = self
                    .axes
                    .iter()
                    .zip(&index)
                    .map(|(axis, &i)| axis.values[i])
                    .collect();
                ScanCell {
                    path: self.cell_path(&index),
                    index,
                    values,
                }
            })
            .collect()
    }

    /// Run `read` on every cell (or only the first one) under the missing-cell policy.
    fn fill<T>(
        &self,
        complete: bool,
        what: &str,
        mut read: impl FnMut(&ScanCell) -> Result<Option<T>>,
    ) -> Result<CellGrid<T>> {
        let mut grid: CellGrid<T> = ArrayD::from_shape_fn(IxDyn(&self.shape()), |_| None);
        let cells = self.cells();
        let count = if complete { cells.len() } else { cells.len().min(1) };
        info!("Reading {} for {} cells", what, count);
        for cell in cells.iter().take(count) {
            match read(cell) {
                Ok(value) => grid[IxDyn(&cell.index)] = value,
                Err(err)
                    if err.is_missing_file()
                        && self.config.on_missing_cell == MissingCellPolicy::SkipAsMissing =>
                {
                    warn!("Skipping {}: {}", cell.path.display(), err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(grid)
    }

    /// Read `Input_Model` of every cell, or only the first when `complete` is false.
    pub fn read_namelists(&mut self, complete: bool) -> Result<()> {
        let file = self.config.files.namelist.clone();
        let grid = self.fill(complete, "namelists", |cell| {
            read_namelist(&cell.path.join(&file), 0).map(Some)
        })?;
        self.namelists = Some(grid);
        Ok(())
    }

    /// Read the input profiles named by each cell's namelist.
    pub fn read_profiles(&mut self, complete: bool) -> Result<()> {
        if self.namelists.is_none() || complete {
            debug!("Reading namelists to locate profiles");
            self.read_namelists(complete)?;
        }
        let grid = {
            let namelists = self.namelists.as_ref();
            self.fill(complete, "profiles", |cell| {
                let Some(record) = namelists.and_then(|grid| grid[IxDyn(&cell.index)].as_ref())
                else {
                    debug!("No namelist for {}, skipping profiles", cell.path.display());
                    return Ok(None);
                };
                let name = record.text("ext_prof_name").ok_or_else(|| FarError::MissingField {
                    name: "ext_prof_name".to_string(),
                })?;
                let diiid_u = record.int("DIIID_u").unwrap_or(0);
                let alpha_on = record.int("alpha_on").unwrap_or(0);
                ProfilesInput::read(&cell.path.join(name), diiid_u, alpha_on).map(Some)
            })?
        };
        self.profiles = Some(grid);
        Ok(())
    }

    /// Read the eigensolver output of every cell.
    pub fn read_eigensolver(&mut self, load_modes: bool) -> Result<()> {
        let config = self.config.clone();
        let grid = self.fill(true, "eigensolver data", |cell| {
            EigenSolutionSet::read(&cell.path, &config, load_modes).map(Some)
        })?;
        self.eigen = Some(grid);
        self.renormalized = false;
        Ok(())
    }

    /// Read the mode amplitude tables of every cell.
    pub fn read_modes(&mut self) -> Result<()> {
        let config = self.config.clone();
        let grid = self.fill(true, "modes", |cell| {
            ModeAmplitudes::read(&cell.path, &config).map(Some)
        })?;
        self.modes = Some(grid);
        Ok(())
    }

    /// Read the growth-rate block of every cell's `farprt` and the mean
    /// frequency and growth rate grids.
    pub fn read_growth_rate(&mut self) -> Result<()> {
        let file = self.config.files.farprt.clone();
        let threshold = self.config.convergence_threshold;
        let grid = self.fill(true, "growth rates", |cell| {
            let path = cell.path.join(&file);
            let handle = File::open(&path).map_err(|e| FarError::file_open(&path, e))?;
            let mut reader = LineReader::new(BufReader::new(handle));
            GrowthRateBlock::parse(&mut reader, threshold).map(Some)
        })?;
        let omega = grid.map(|cell| cell.as_ref().map_or(f64::NAN, |block| block.avg_omega));
        let gamma = grid.map(|cell| cell.as_ref().map_or(f64::NAN, |block| block.avg_gamma));
        self.growth = Some(grid);
        self.omega = Some(omega);
        self.gamma = Some(gamma);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_2d(root: &Path) {
        for a in ["0.5", "1.0"] {
            for b in ["10", "20", "30"] {
                let dir = root.join(format!("alpha_{}", a)).join(format!("ncase_{}", b));
                fs::create_dir_all(&dir).unwrap();
                fs::write(
                    dir.join("farprt"),
                    format!(" psi   : m= 1 n= 1 gamma= {} omega= {}\n", a, b),
                )
                .unwrap();
            }
        }
    }

    #[test]
    fn cells_reconstruct_paths_in_row_major_order() {
        let dir = TempDir::new().unwrap();
        make_2d(dir.path());
        let scan = Scan::discover_2d(dir.path(), ReaderConfig::default()).unwrap();
        assert_eq!(scan.shape(), vec![2, 3]);
        let cells = scan.cells();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[4].index, vec![1, 1]);
        assert_eq!(cells[4].values, vec![1.0, 20.0]);
        assert_eq!(cells[4].path, dir.path().join("alpha_1.0").join("ncase_20"));
        assert!(cells.iter().all(|cell| cell.path.is_dir()));
    }

    #[test]
    fn growth_rates_fill_summary_grids() {
        let dir = TempDir::new().unwrap();
        make_2d(dir.path());
        let mut scan = Scan::discover_2d(dir.path(), ReaderConfig::default()).unwrap();
        scan.read_growth_rate().unwrap();
        let omega = scan.omega.as_ref().unwrap();
        let gamma = scan.gamma.as_ref().unwrap();
        assert_eq!(omega[[0, 2]], 30.0);
        assert_eq!(gamma[[1, 0]], 1.0);
    }

    #[test]
    fn missing_cell_aborts_or_is_skipped() {
        let dir = TempDir::new().unwrap();
        make_2d(dir.path());
        fs::remove_file(dir.path().join("alpha_0.5").join("ncase_20").join("farprt")).unwrap();

        let mut strict = Scan::discover_2d(dir.path(), ReaderConfig::default()).unwrap();
        assert!(strict.read_growth_rate().unwrap_err().is_missing_file());

        let config = ReaderConfig::default().with_missing_cell_policy(MissingCellPolicy::SkipAsMissing);
        let mut lenient = Scan::discover_2d(dir.path(), config).unwrap();
        lenient.read_growth_rate().unwrap();
        let omega = lenient.omega.as_ref().unwrap();
        assert!(omega[[0, 1]].is_nan());
        assert_eq!(omega[[0, 2]], 30.0);
        assert!(lenient.growth.as_ref().unwrap()[[0, 1]].is_none());
    }

    #[test]
    fn incomplete_read_touches_only_the_reference_cell() {
        let dir = TempDir::new().unwrap();
        make_2d(dir.path());
        let mut scan = Scan::discover_2d(dir.path(), ReaderConfig::default()).unwrap();
        // No Input_Model anywhere: only the first cell is attempted.
        let err = scan.read_namelists(false).unwrap_err();
        match err {
            FarError::MissingFile { path } => {
                assert_eq!(path, dir.path().join("alpha_0.5/ncase_10/Input_Model"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
