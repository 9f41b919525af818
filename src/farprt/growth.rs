//! Growth-rate lines of the solver log.

use crate::error::Result;
use crate::tokens::LineReader;
use ndarray::{Array1, Array3};
use std::collections::BTreeSet;
use std::io::BufRead;
use tracing::{info, warn};

/// Line prefixes of the growth-rate block, in table order.
pub const GROWTH_TAGS: [&str; 6] = [
    " psi   :", " phi   :", " pr    :", " nfast :", " vfast :", " vth   :",
];

/// Variable names matching [`GROWTH_TAGS`].
pub const GROWTH_VARIABLES: [&str; 6] = ["psi", "phi", "pr", "nfast", "vfast", "vth"];

/// One growth-rate reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthReading {
    /// Index into [`GROWTH_VARIABLES`].
    pub variable: usize,
    /// Poloidal number.
    pub m: i32,
    /// Toroidal number.
    pub n: i32,
    /// Growth rate.
    pub gamma: f64,
    /// Frequency.
    pub omega: f64,
}

// FAR3D drops the `e` of three-digit exponents (`4-280`); such values read as zero.
fn tolerant<T: std::str::FromStr + Default>(tokens: &[&str], index: usize) -> T {
    tokens
        .get(index)
        .and_then(|token| token.parse().ok())
        .unwrap_or_default()
}

/// Parse a log line, `None` unless it starts with a growth-rate tag.
///
/// Token positions: 0 variable, 3 `m`, 5 `n`, 7 growth rate, 9 frequency.
pub fn parse_growth_line(line: &str) -> Option<GrowthReading> {
    let variable = GROWTH_TAGS.iter().position(|tag| line.starts_with(tag))?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    Some(GrowthReading {
        variable,
        m: tolerant(&tokens, 3),
        n: tolerant(&tokens, 5),
        gamma: tolerant(&tokens, 7),
        omega: tolerant(&tokens, 9),
    })
}

/// Spread of the growth rates of one toroidal number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceReport {
    /// Toroidal number.
    pub n: i32,
    /// Population standard deviation over mean.
    pub ratio: f64,
    /// `ratio` did not exceed the threshold.
    pub converged: bool,
}

/// Coefficient of variation with the population standard deviation.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
    variance.sqrt() / mean
}

fn nan_mean<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Growth rates and frequencies of a log, on a dense `(m, n, variable)` grid.
#[derive(Debug, Clone)]
pub struct GrowthRateBlock {
    /// Sorted poloidal numbers.
    pub m: Vec<i32>,
    /// Sorted toroidal numbers.
    pub n: Vec<i32>,
    /// Frequency, NaN where no reading exists.
    pub omega: Array3<f64>,
    /// Growth rate, NaN where no reading exists.
    pub gamma: Array3<f64>,
    /// Mean frequency per toroidal number.
    pub avg_omega_n: Array1<f64>,
    /// Mean growth rate per toroidal number.
    pub avg_gamma_n: Array1<f64>,
    /// Mean frequency over the table.
    pub avg_omega: f64,
    /// Mean growth rate over the table.
    pub avg_gamma: f64,
    /// Per-`n` convergence.
    pub convergence: Vec<ConvergenceReport>,
}

impl GrowthRateBlock {
    /// Scan a whole log for growth-rate lines.
    pub fn parse<R: BufRead>(reader: &mut LineReader<R>, threshold: f64) -> Result<Self> {
        info!("Reading growth rate block");
        let mut readings = Vec::new();
        while let Some(line) = reader.next_line()? {
            if let Some(reading) = parse_growth_line(line) {
                readings.push(reading);
            }
        }
        Ok(Self::from_readings(&readings, threshold))
    }

    /// Build the tables from parsed readings. Later readings overwrite earlier ones.
    pub fn from_readings(readings: &[GrowthReading], threshold: f64) -> Self {
        let m: Vec<i32> = readings
            .iter()
            .map(|r| r.m)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let n: Vec<i32> = readings
            .iter()
            .map(|r| r.n)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let convergence = n
            .iter()
            .map(|&kn| {
                let gammas: Vec<f64> = readings
                    .iter()
                    .filter(|r| r.n == kn)
                    .map(|r| r.gamma)
                    .collect();
                let ratio = coefficient_of_variation(&gammas);
                let converged = ratio.is_nan() || ratio <= threshold;
                if !converged {
                    warn!("No convergence: n={} std_gamma/mean_gamma = {:.6}", kn, ratio);
                }
                ConvergenceReport {
                    n: kn,
                    ratio,
                    converged,
                }
            })
            .collect();

        let shape = (m.len(), n.len(), GROWTH_VARIABLES.len());
        let mut omega = Array3::from_elem(shape, f64::NAN);
        let mut gamma = Array3::from_elem(shape, f64::NAN);
        for reading in readings {
            let (Ok(im), Ok(inn)) = (m.binary_search(&reading.m), n.binary_search(&reading.n))
            else {
                continue;
            };
            omega[[im, inn, reading.variable]] = reading.omega;
            gamma[[im, inn, reading.variable]] = reading.gamma;
        }

        let avg_omega_n = (0..n.len())
            .map(|k| nan_mean(omega.index_axis(ndarray::Axis(1), k).iter()))
            .collect();
        let avg_gamma_n = (0..n.len())
            .map(|k| nan_mean(gamma.index_axis(ndarray::Axis(1), k).iter()))
            .collect();

        Self {
            avg_omega: nan_mean(omega.iter()),
            avg_gamma: nan_mean(gamma.iter()),
            m,
            n,
            omega,
            gamma,
            avg_omega_n,
            avg_gamma_n,
            convergence,
        }
    }

    /// Whether every toroidal number converged.
    pub fn converged(&self) -> bool {
        self.convergence.iter().all(|report| report.converged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn block(text: &str, threshold: f64) -> GrowthRateBlock {
        let mut reader = LineReader::new(Cursor::new(text.as_bytes().to_vec()));
        GrowthRateBlock::parse(&mut reader, threshold).unwrap()
    }

    #[test]
    fn truncated_exponent_reads_as_zero() {
        let reading =
            parse_growth_line(" phi   : m=  2 n=  1 gamma=  4-280 omega=  0.35").unwrap();
        assert_eq!(reading.variable, 1);
        assert_eq!((reading.m, reading.n), (2, 1));
        assert_eq!(reading.gamma, 0.0);
        assert_eq!(reading.omega, 0.35);
    }

    #[test]
    fn short_and_untagged_lines() {
        let reading = parse_growth_line(" vth   : m=").unwrap();
        assert_eq!((reading.variable, reading.m, reading.n), (5, 0, 0));
        assert!(parse_growth_line("psi   : m= 1").is_none());
        assert!(parse_growth_line(" psi  : m= 1").is_none());
    }

    #[test]
    fn close_readings_converge() {
        let log = "header\n psi   : m= 1 n= 1 gamma= 0.10 omega= 0.5\n \
                   phi   : m= 2 n= 1 gamma= 0.11 omega= 0.7\nfooter\n";
        let b = block(log, 0.1);
        let report = b.convergence[0];
        assert_eq!(report.n, 1);
        assert!((report.ratio - 0.047_619).abs() < 1e-5);
        assert!(report.converged);
        assert!(b.converged());
    }

    #[test]
    fn spread_readings_do_not_converge() {
        let log = " psi   : m= 1 n= 1 gamma= 0.10 omega= 0.5\n \
                   phi   : m= 1 n= 1 gamma= 0.50 omega= 0.5\n";
        let b = block(log, 0.1);
        assert!(b.convergence[0].ratio > 0.1);
        assert!(!b.converged());
    }

    #[test]
    fn dense_table_and_nan_aware_means() {
        let log = " psi   : m= 1 n= 1 gamma= 0.2 omega= 1.0\n \
                   vth   : m= 3 n= 2 gamma= 0.4 omega= 3.0\n \
                   pr    : m= 1 n= 2 gamma= 0.6 omega= 5.0\n";
        let b = block(log, 10.0);
        assert_eq!(b.m, vec![1, 3]);
        assert_eq!(b.n, vec![1, 2]);
        assert_eq!(b.omega.shape(), &[2, 2, 6]);
        assert_eq!(b.gamma[[1, 1, 5]], 0.4);
        assert!(b.gamma[[1, 0, 0]].is_nan());
        assert_eq!(b.avg_omega_n.to_vec(), vec![1.0, 4.0]);
        assert!((b.avg_gamma - 0.4).abs() < 1e-12);
    }
}
