//! Plain-text summaries of decoded FAR3D output.

use crate::eigen::{EigenSolutionSet, FrequencyUnits};
use crate::farprt::{EnergyBlock, GrowthRateBlock};
use crate::modes::ModeAmplitudes;
use crate::namelist::{NamelistRecord, NamelistValue};
use crate::scan::Scan;
use ndarray::IxDyn;
use std::fmt::Write;

/// Format a number with thousand separators.
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format a float with precision chosen from its magnitude.
pub fn format_stat_value(val: f64) -> String {
    if !val.is_finite() {
        return if val.is_nan() {
            "NaN".to_string()
        } else if val.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        };
    }
    let abs_val = val.abs();
    if abs_val == 0.0 {
        "0".to_string()
    } else if !(1e-3..1e6).contains(&abs_val) {
        format!("{:.3e}", val)
    } else if abs_val >= 100.0 {
        format!("{:.2}", val)
    } else if abs_val >= 1.0 {
        format!("{:.4}", val)
    } else {
        format!("{:.5}", val)
    }
}

fn format_namelist_value(value: &NamelistValue) -> String {
    match value {
        NamelistValue::Int(v) => v.to_string(),
        NamelistValue::Float(v) => format_stat_value(*v),
        NamelistValue::Bool(v) => v.to_string(),
        NamelistValue::Text(v) => format!("'{}'", v),
        NamelistValue::IntVector(v) => format!(
            "[{}]",
            v.iter().map(i64::to_string).collect::<Vec<_>>().join(", ")
        ),
        NamelistValue::FloatVector(v) => format!(
            "[{}]",
            v.iter()
                .map(|x| format_stat_value(*x))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// One `name = value` line per field, unset fields included.
pub fn namelist_summary(record: &NamelistRecord) -> String {
    let width = record.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, value) in record.iter() {
        let text = value.map_or_else(|| "<unset>".to_string(), format_namelist_value);
        let _ = writeln!(out, "{:<width$} = {}", name, text, width = width);
    }
    out
}

fn units_label(units: FrequencyUnits) -> &'static str {
    match units {
        FrequencyUnits::Code => "code units",
        FrequencyUnits::KiloHertz => "kHz",
    }
}

/// Accepted eigenvalues, most unstable first.
pub fn eigen_summary(set: &EigenSolutionSet) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} of {} eigenvalues accepted, {} poloidal modes, {} radial points",
        set.path.display(),
        format_number(set.values.len()),
        format_number(set.header.eigen_count),
        set.header.poloidal_count,
        set.header.radial_points
    );
    if let Some(modes) = &set.modes {
        let _ = writeln!(
            out,
            "eigenvectors: {} ({:?} header)",
            format_number(modes.accepted_count()),
            modes.dialect
        );
    }

    let mut order: Vec<usize> = (0..set.values.len()).collect();
    order.sort_by(|&a, &b| set.values.gamma[b].total_cmp(&set.values.gamma[a]));
    let _ = writeln!(
        out,
        "{:>6} {:>14} {:>14}",
        "j",
        format!("omega [{}]", units_label(set.units)),
        "gamma"
    );
    for j in order {
        let _ = writeln!(
            out,
            "{:>6} {:>14} {:>14}",
            j,
            format_stat_value(set.values.omega[j]),
            format_stat_value(set.values.gamma[j])
        );
    }
    out
}

/// Averages and convergence per toroidal number.
pub fn growth_summary(block: &GrowthRateBlock) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "omega = {}  gamma = {}",
        format_stat_value(block.avg_omega),
        format_stat_value(block.avg_gamma)
    );
    let _ = writeln!(out, "{:>5} {:>12} {:>12} {:>10}  status", "n", "omega", "gamma", "cv");
    for (i, report) in block.convergence.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>5} {:>12} {:>12} {:>10}  {}",
            report.n,
            format_stat_value(block.avg_omega_n[i]),
            format_stat_value(block.avg_gamma_n[i]),
            format_stat_value(report.ratio),
            if report.converged { "ok" } else { "not converged" }
        );
    }
    out
}

/// Step count and final kinetic energy per harmonic.
pub fn energy_summary(block: &EnergyBlock) -> String {
    let steps = block.steps();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} rows over {} steps",
        format_number(block.rows.len()),
        format_number(steps.len())
    );
    if let (Some(first), Some(last)) = (steps.first(), steps.last()) {
        let _ = writeln!(
            out,
            "nstep {} .. {}, time {} .. {}",
            first.0,
            last.0,
            format_stat_value(first.1),
            format_stat_value(last.1)
        );
        let _ = writeln!(out, "{:>5} {:>5} {:>12} {:>12}", "n", "m", "ke", "gamke");
        for row in block.rows.iter().filter(|row| row.step.nstep == last.0) {
            let _ = writeln!(
                out,
                "{:>5} {:>5} {:>12} {:>12}",
                row.n,
                row.m,
                format_stat_value(row.ke),
                format_stat_value(row.gamke)
            );
        }
    }
    out
}

/// Runs, modes and the peak amplitude of each loaded variable.
pub fn modes_summary(amplitudes: &ModeAmplitudes) -> String {
    let modes = &amplitudes.modes;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} runs, {} modes ({:?} header), {} radial points",
        amplitudes.path.display(),
        amplitudes.runs.len(),
        modes.len(),
        modes.dialect,
        amplitudes.r.len()
    );
    for variable in amplitudes.variables() {
        let peak = modes
            .m
            .iter()
            .zip(&modes.n)
            .filter_map(|(&m, &n)| {
                amplitudes
                    .peak_amplitude(variable, n, m)
                    .map(|value| (value, n, m))
            })
            .max_by(|a, b| a.0.total_cmp(&b.0));
        match peak {
            Some((value, n, m)) => {
                let _ = writeln!(
                    out,
                    "{:<8} peak {} at n={} m={}",
                    variable,
                    format_stat_value(value),
                    n,
                    m
                );
            }
            None => {
                let _ = writeln!(out, "{:<8} no data", variable);
            }
        }
    }
    for (variable, values) in &amplitudes.energy {
        let last = amplitudes.runs.len().saturating_sub(1);
        let total: f64 = values
            .index_axis(ndarray::Axis(0), last)
            .iter()
            .filter(|value| !value.is_nan())
            .sum();
        let _ = writeln!(
            out,
            "{:<8} energy {} at t={}",
            variable,
            format_stat_value(total),
            format_stat_value(amplitudes.time[last])
        );
    }
    out
}

/// Axes and the per-cell quantities read so far.
pub fn scan_summary(scan: &Scan) -> String {
    let mut out = String::new();
    for axis in &scan.axes {
        let _ = writeln!(
            out,
            "{}: {} values, {} decimals",
            axis.name,
            axis.len(),
            axis.decimals
        );
    }
    for cell in scan.cells() {
        let coords = scan
            .axes
            .iter()
            .zip(&cell.values)
            .map(|(axis, &value)| format!("{}={}", axis.name, axis.format_value(value)))
            .collect::<Vec<_>>()
            .join(" ");
        let mut line = coords;
        if let (Some(omega), Some(gamma)) = (&scan.omega, &scan.gamma) {
            let _ = write!(
                line,
                "  omega={} gamma={}",
                format_stat_value(omega[IxDyn(&cell.index)]),
                format_stat_value(gamma[IxDyn(&cell.index)])
            );
        }
        if let Some(eigen) = &scan.eigen {
            match &eigen[IxDyn(&cell.index)] {
                Some(set) => match set.values.most_unstable() {
                    Some(j) => {
                        let _ = write!(
                            line,
                            "  eigen j={} omega={} gamma={}",
                            j,
                            format_stat_value(set.values.omega[j]),
                            format_stat_value(set.values.gamma[j])
                        );
                    }
                    None => line.push_str("  eigen none accepted"),
                },
                None => line.push_str("  eigen missing"),
            }
        }
        let _ = writeln!(out, "{}", line);
    }
    out
}
