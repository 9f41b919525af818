//! Reader configuration.
//!
//! Every decoder and aggregator takes a `ReaderConfig` explicitly; there is no
//! process-wide path state.

/// File names expected inside a single simulation case directory.
#[derive(Debug, Clone)]
pub struct CaseFiles {
    /// Input namelist.
    pub namelist: String,
    /// Free-form solver log.
    pub farprt: String,
    /// Eigenvalue table.
    pub egn_values: String,
    /// Eigenvector dump.
    pub egn_modes: String,
}

impl Default for CaseFiles {
    fn default() -> Self {
        Self {
            namelist: "Input_Model".to_string(),
            farprt: "farprt".to_string(),
            egn_values: "egn_values.dat".to_string(),
            egn_modes: "egn_mode_asci.dat".to_string(),
        }
    }
}

/// Eigensolver acceptance filter.
#[derive(Debug, Clone, Copy)]
pub struct EigenConfig {
    /// Scale applied to frequencies; the filter compares `value * scale^2`.
    pub frequency_scale: f64,
    /// Eigen-indices at or above this value (code units) are discarded.
    pub validity_ceiling: f64,
}

impl Default for EigenConfig {
    fn default() -> Self {
        Self {
            frequency_scale: 1.0,
            validity_ceiling: 1.0e6,
        }
    }
}

/// What a scan does when a cell's input file is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingCellPolicy {
    /// Stop the whole read with the error.
    #[default]
    Abort,
    /// Leave the cell empty (NaN in summary grids) and continue.
    SkipAsMissing,
}

/// Combined configuration for all readers.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Case file names.
    pub files: CaseFiles,
    /// Eigensolver filter.
    pub eigen: EigenConfig,
    /// Coefficient of variation above which a toroidal number is flagged.
    pub convergence_threshold: f64,
    /// Line offset of the namelist embedded in `farprt`.
    pub farprt_namelist_offset: usize,
    /// Variable whose files enumerate the runs of a mode-amplitude dump.
    pub mode_header_variable: String,
    /// Mode-amplitude variables to load.
    pub mode_variables: Vec<String>,
    /// Per-mode energy variables to load alongside the amplitudes.
    pub energy_variables: Vec<String>,
    /// Missing-file behaviour for scans.
    pub on_missing_cell: MissingCellPolicy,
}

/// Default eigenfunction variables written by FAR3D.
pub const DEFAULT_MODE_VARIABLES: [&str; 12] = [
    "vthprlf", "vth", "vr", "vprlf", "uzt", "psi", "pr", "phi", "nf", "curzt", "bth", "br",
];

/// Default per-mode energy variables. Names ending in `nc` hold the
/// non-conservative terms.
pub const DEFAULT_ENERGY_VARIABLES: [&str; 6] = ["evprlfnc", "evprlf", "emenc", "eme", "ekenc", "eke"];

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            files: CaseFiles::default(),
            eigen: EigenConfig::default(),
            convergence_threshold: 0.1,
            farprt_namelist_offset: 11,
            mode_header_variable: "psi".to_string(),
            mode_variables: DEFAULT_MODE_VARIABLES.iter().map(|s| s.to_string()).collect(),
            energy_variables: DEFAULT_ENERGY_VARIABLES.iter().map(|s| s.to_string()).collect(),
            on_missing_cell: MissingCellPolicy::Abort,
        }
    }
}

impl ReaderConfig {
    /// Set the missing-cell policy.
    pub fn with_missing_cell_policy(mut self, policy: MissingCellPolicy) -> Self {
        self.on_missing_cell = policy;
        self
    }

    /// Set the convergence threshold.
    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    /// Set the eigensolver validity ceiling.
    pub fn with_validity_ceiling(mut self, ceiling: f64) -> Self {
        self.eigen.validity_ceiling = ceiling;
        self
    }
}
