//! Farscan - summaries of FAR3D output from the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use farscan::eigen::EigenSolutionSet;
use farscan::farprt::FarprtReport;
use farscan::modes::ModeAmplitudes;
use farscan::namelist::read_namelist;
use farscan::report;
use farscan::scan::Scan;
use farscan::{MissingCellPolicy, ReaderConfig};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "farscan")]
#[command(about = "Decode FAR3D stability-code output", long_about = None)]
struct Args {
    /// Enable logging to specified file
    #[arg(long)]
    log: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the fields of an input namelist
    Namelist {
        /// Namelist file (`Input_Model` or a `farprt` log)
        file: PathBuf,
        /// Lines to skip before the namelist
        #[arg(long, default_value_t = 0)]
        header: usize,
    },
    /// Summarize the mode-amplitude tables of a case
    Modes {
        /// Case directory
        dir: PathBuf,
    },
    /// List the accepted eigenvalues of a case
    Eigen {
        /// Case directory
        dir: PathBuf,
        /// Also load the eigenvectors
        #[arg(long)]
        modes: bool,
    },
    /// Growth rates and convergence from a solver log
    Growth {
        /// `farprt` log
        file: PathBuf,
        /// Coefficient of variation above which `n` is flagged
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Energy history from a solver log
    Energy {
        /// `farprt` log
        file: PathBuf,
    },
    /// Read a one-dimensional scan
    Scan1d {
        /// Directory holding `<name>_<value>` cases
        root: PathBuf,
        /// Folder prefix before the scan variable
        #[arg(long)]
        prefix: Option<String>,
        /// Leave cells with missing files empty
        #[arg(long)]
        skip_missing: bool,
        /// Convert eigen frequencies to kHz
        #[arg(long)]
        renorm: bool,
        /// Write the growth-rate grids to a NetCDF file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
    /// Read a two-dimensional scan
    Scan2d {
        /// Directory holding `<name1>_<value1>/<name2>_<value2>` cases
        root: PathBuf,
        /// Leave cells with missing files empty
        #[arg(long)]
        skip_missing: bool,
        /// Write the growth-rate grids to a NetCDF file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
}

fn init_logging(log: Option<&PathBuf>) -> Result<()> {
    if let Some(log_path) = log {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

fn scan_config(skip_missing: bool) -> ReaderConfig {
    let policy = if skip_missing {
        MissingCellPolicy::SkipAsMissing
    } else {
        MissingCellPolicy::Abort
    };
    ReaderConfig::default().with_missing_cell_policy(policy)
}

fn export_growth_rate(scan: &Scan, export: Option<&PathBuf>) -> Result<()> {
    if let Some(path) = export {
        scan.export_growth_rate(path)
            .with_context(|| format!("Failed to export growth rates to {}", path.display()))?;
    }
    Ok(())
}

fn run(command: Command) -> Result<String> {
    let output = match command {
        Command::Namelist { file, header } => {
            let record = read_namelist(&file, header)
                .with_context(|| format!("Failed to decode namelist {}", file.display()))?;
            report::namelist_summary(&record)
        }
        Command::Modes { dir } => {
            let amplitudes = ModeAmplitudes::read(&dir, &ReaderConfig::default())
                .with_context(|| format!("Failed to read mode tables in {}", dir.display()))?;
            report::modes_summary(&amplitudes)
        }
        Command::Eigen { dir, modes } => {
            let set = EigenSolutionSet::read(&dir, &ReaderConfig::default(), modes)
                .with_context(|| format!("Failed to read eigensolver output in {}", dir.display()))?;
            report::eigen_summary(&set)
        }
        Command::Growth { file, threshold } => {
            let mut config = ReaderConfig::default();
            if let Some(threshold) = threshold {
                config = config.with_convergence_threshold(threshold);
            }
            let block = FarprtReport::new(&file, &config)
                .growth_rate()
                .with_context(|| format!("Failed to read growth rates from {}", file.display()))?;
            report::growth_summary(&block)
        }
        Command::Energy { file } => {
            let block = FarprtReport::new(&file, &ReaderConfig::default())
                .energy_block()
                .with_context(|| format!("Failed to read energy block from {}", file.display()))?;
            report::energy_summary(&block)
        }
        Command::Scan1d {
            root,
            prefix,
            skip_missing,
            renorm,
            export,
        } => {
            let mut scan = Scan::discover_1d(&root, prefix.as_deref(), scan_config(skip_missing))
                .with_context(|| format!("Failed to discover scan in {}", root.display()))?;
            scan.read_eigensolver(false)?;
            scan.read_growth_rate()?;
            if renorm {
                scan.read_profiles(false)?;
                let factor = scan.renormalize_eigen_frequencies(false)?;
                tracing::info!("Frequency factor {} kHz", factor);
            }
            export_growth_rate(&scan, export.as_ref())?;
            report::scan_summary(&scan)
        }
        Command::Scan2d {
            root,
            skip_missing,
            export,
        } => {
            let mut scan = Scan::discover_2d(&root, scan_config(skip_missing))
                .with_context(|| format!("Failed to discover scan in {}", root.display()))?;
            scan.read_eigensolver(false)?;
            scan.read_growth_rate()?;
            export_growth_rate(&scan, export.as_ref())?;
            report::scan_summary(&scan)
        }
    };
    Ok(output)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log.as_ref())?;
    tracing::info!("Starting Farscan");

    let output = run(args.command)?;
    print!("{}", output);

    tracing::info!("Farscan exited");
    Ok(())
}
