//! Mode-number headers of FAR3D amplitude tables.
//!
//! The first line of a table lists the radial column and then one `m/ n`
//! label per amplitude column. Two dialects exist:
//!
//! - [`Dialect::Legacy`]: real columns are labelled with `m >= 0` and the
//!   imaginary columns repeat the labels with negative `m`.
//! - [`Dialect::RealImag`]: an `R` block then an `I` block with the same
//!   labels.

use crate::error::{FarError, Result};
use std::collections::BTreeSet;

/// Token that opens the imaginary block of a `RealImag` header.
pub const IMAGINARY_MARKER: &str = "I";

/// Header layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Imaginary block signalled by negative `m`.
    Legacy,
    /// Explicit `R` / `I` blocks.
    RealImag,
}

/// Classify a tokenised header line.
pub fn classify_header(tokens: &[&str]) -> Dialect {
    if tokens.iter().any(|token| *token == IMAGINARY_MARKER) {
        Dialect::RealImag
    } else {
        Dialect::Legacy
    }
}

/// Extract the `(m, n)` lists of the real block.
pub fn extract_modes(tokens: &[&str], dialect: Dialect) -> Result<(Vec<i32>, Vec<i32>)> {
    let mut m = Vec::new();
    let mut n = Vec::new();
    for token in tokens {
        if dialect == Dialect::RealImag && *token == IMAGINARY_MARKER {
            break;
        }
        let parts: Vec<&str> = token.split('/').collect();
        if parts.len() == 2 {
            let value = parts[0]
                .trim()
                .parse::<i32>()
                .map_err(|_| FarError::parse("mode header", 1, *token, "an m/n label"))?;
            if dialect == Dialect::Legacy && value < 0 {
                break;
            }
            m.push(value);
            if let Ok(value) = parts[1].trim().parse::<i32>() {
                n.push(value);
            }
        } else if let Ok(value) = token.parse::<i32>() {
            n.push(value);
        }
    }
    if m.len() != n.len() {
        return Err(FarError::ShapeMismatch(format!(
            "mode header lists {} poloidal and {} toroidal numbers",
            m.len(),
            n.len()
        )));
    }
    Ok((m, n))
}

/// Mode numbers of an amplitude table, with their position in the
/// deduplicated `(n, m)` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeSet {
    /// Header layout the set was read from.
    pub dialect: Dialect,
    /// Poloidal number of each column.
    pub m: Vec<i32>,
    /// Toroidal number of each column.
    pub n: Vec<i32>,
    /// Sorted unique toroidal numbers.
    pub unique_n: Vec<i32>,
    /// Sorted unique poloidal numbers.
    pub unique_m: Vec<i32>,
    /// `(n_index, m_index)` of each column.
    pub grid_index: Vec<(usize, usize)>,
}

impl ModeSet {
    /// Build from a header line and the table's declared column count.
    pub fn from_header(line: &str, declared_columns: usize) -> Result<Self> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let dialect = classify_header(&tokens);
        let (m, n) = extract_modes(&tokens, dialect)?;
        let expected = 2 * m.len() + 1;
        if expected != declared_columns {
            return Err(FarError::ColumnMismatch {
                context: "mode header".to_string(),
                expected,
                found: declared_columns,
            });
        }
        Ok(Self::from_lists(dialect, m, n))
    }

    /// Build from explicit lists.
    pub fn from_lists(dialect: Dialect, m: Vec<i32>, n: Vec<i32>) -> Self {
        let unique_n: Vec<i32> = n.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let unique_m: Vec<i32> = m.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let grid_index = m
            .iter()
            .zip(&n)
            .map(|(mi, ni)| {
                (
                    unique_n.binary_search(ni).unwrap_or_default(),
                    unique_m.binary_search(mi).unwrap_or_default(),
                )
            })
            .collect();
        Self {
            dialect,
            m,
            n,
            unique_n,
            unique_m,
            grid_index,
        }
    }

    /// Number of modes (columns per component).
    pub fn len(&self) -> usize {
        self.m.len()
    }

    /// Whether the header listed no modes.
    pub fn is_empty(&self) -> bool {
        self.m.is_empty()
    }

    /// Column count of a table with this header.
    pub fn column_count(&self) -> usize {
        2 * self.len() + 1
    }
}
