//! Energy block of the solver log.
//!
//! Each output step writes a header
//! `energy:numrun=…, numruno=…, nstep=…, time=…, dt=…`, a blank line, a column
//! header and one row per harmonic: `l m n ke me vprlf gamke gamme gamvpr`.

use crate::error::{FarError, Result};
use crate::tokens::LineReader;
use std::io::BufRead;
use std::str::FromStr;

/// Prefix of an energy header line.
pub const ENERGY_HEADER: &str = "energy:numrun";

// Harmonic rows are wide; the line closing a block is not.
const MIN_ROW_WIDTH: usize = 60;

/// Step metadata shared by the rows of one block.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyStep {
    /// Run identifier.
    pub numrun: String,
    /// Identifier of the run restarted from.
    pub numruno: String,
    /// Time step.
    pub nstep: i64,
    /// Simulation time.
    pub time: f64,
    /// Time step size.
    pub dt: f64,
}

/// One harmonic at one output step.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyRow {
    /// Harmonic index within the step.
    pub l: i32,
    /// Poloidal number.
    pub m: i32,
    /// Toroidal number.
    pub n: i32,
    /// Kinetic energy.
    pub ke: f64,
    /// Magnetic energy.
    pub me: f64,
    /// Fast-ion parallel velocity energy.
    pub vprlf: f64,
    /// Growth rate of `ke`.
    pub gamke: f64,
    /// Growth rate of `me`.
    pub gamme: f64,
    /// Growth rate of `vprlf`.
    pub gamvpr: f64,
    /// `ke + me`.
    pub te: f64,
    /// Step the row belongs to.
    pub step: EnergyStep,
}

fn field<T: FromStr>(part: &str, line: usize) -> Result<T> {
    let value = part.rsplit('=').next().unwrap_or("").trim();
    value
        .parse()
        .map_err(|_| FarError::parse("energy header", line, value, "a number"))
}

/// Parse an `energy:numrun=…` header line.
pub fn parse_step_header(text: &str, line: usize) -> Result<EnergyStep> {
    let parts: Vec<&str> = text.split(',').collect();
    if parts.len() != 5 {
        return Err(FarError::ColumnMismatch {
            context: format!("energy header line {}", line),
            expected: 5,
            found: parts.len(),
        });
    }
    let text_field = |part: &str| part.rsplit('=').next().unwrap_or("").trim().to_string();
    Ok(EnergyStep {
        numrun: text_field(parts[0]),
        numruno: text_field(parts[1]),
        nstep: field(parts[2], line)?,
        time: field(parts[3], line)?,
        dt: field(parts[4], line)?,
    })
}

fn strict<T: FromStr>(tokens: &[&str], index: usize, line: usize, expected: &'static str) -> Result<T> {
    let token = tokens
        .get(index)
        .ok_or_else(|| FarError::parse("energy row", line, "", expected))?;
    token
        .parse()
        .map_err(|_| FarError::parse("energy row", line, *token, expected))
}

// Energies may carry truncated exponents (`4-280`); they read as zero.
fn tolerant(tokens: &[&str], index: usize) -> f64 {
    tokens
        .get(index)
        .and_then(|token| token.parse().ok())
        .unwrap_or(0.0)
}

/// Parse one harmonic row.
pub fn parse_row(text: &str, line: usize, step: &EnergyStep) -> Result<EnergyRow> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let ke = tolerant(&tokens, 3);
    let me = tolerant(&tokens, 4);
    Ok(EnergyRow {
        l: strict(&tokens, 0, line, "an integer")?,
        m: strict(&tokens, 1, line, "an integer")?,
        n: strict(&tokens, 2, line, "an integer")?,
        ke,
        me,
        vprlf: tolerant(&tokens, 5),
        gamke: strict(&tokens, 6, line, "a float")?,
        gamme: strict(&tokens, 7, line, "a float")?,
        gamvpr: strict(&tokens, 8, line, "a float")?,
        te: ke + me,
        step: step.clone(),
    })
}

/// Every energy row of a log, in file order.
#[derive(Debug, Clone, Default)]
pub struct EnergyBlock {
    /// Rows of every step.
    pub rows: Vec<EnergyRow>,
}

impl EnergyBlock {
    /// Scan a log for energy blocks.
    pub fn parse<R: BufRead>(reader: &mut LineReader<R>) -> Result<Self> {
        let mut rows = Vec::new();
        while let Some(line) = reader.next_line()? {
            if !line.starts_with(ENERGY_HEADER) {
                continue;
            }
            let header = line.to_string();
            let step = parse_step_header(&header, reader.line_number())?;
            reader.skip_lines(2, "energy block")?;
            while let Some(row) = reader.next_line()? {
                if row.len() < MIN_ROW_WIDTH {
                    break;
                }
                let row = row.to_string();
                rows.push(parse_row(&row, reader.line_number(), &step)?);
            }
        }
        Ok(Self { rows })
    }

    /// Distinct `(nstep, time)` pairs in file order.
    pub fn steps(&self) -> Vec<(i64, f64)> {
        let mut steps: Vec<(i64, f64)> = Vec::new();
        for row in &self.rows {
            if steps.last().map(|(nstep, _)| *nstep) != Some(row.step.nstep) {
                steps.push((row.step.nstep, row.step.time));
            }
        }
        steps
    }

    /// Simulation time of a step.
    pub fn step_to_time(&self, nstep: i64) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.step.nstep == nstep)
            .map(|row| row.step.time)
    }

    /// Step whose time is closest to `time`.
    pub fn time_to_step(&self, time: f64) -> Option<i64> {
        self.steps()
            .into_iter()
            .min_by(|a, b| (a.1 - time).abs().total_cmp(&(b.1 - time).abs()))
            .map(|(nstep, _)| nstep)
    }

    /// Rows of one harmonic, in time order.
    pub fn harmonic(&self, n: i32, m: i32) -> impl Iterator<Item = &EnergyRow> {
        self.rows.iter().filter(move |row| row.n == n && row.m == m)
    }
}
