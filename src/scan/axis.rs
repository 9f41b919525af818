//! Scan axes recovered from `<name>_<value>` directory names.

use crate::error::{FarError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Decimal places of a value string, as the absolute decimal exponent.
///
/// `"0.010"` has 3, `"1e-3"` has 3, `"100"` has 0.
pub fn infer_decimals(value: &str) -> usize {
    let value = value.trim();
    let (mantissa, exponent) = match value.find(&['e', 'E'][..]) {
        Some(pos) => (&value[..pos], value[pos + 1..].parse::<i64>().unwrap_or(0)),
        None => (value, 0),
    };
    let fraction = mantissa
        .split_once('.')
        .map_or(0, |(_, digits)| digits.len() as i64);
    (exponent - fraction).unsigned_abs() as usize
}

/// Render a value with a fixed number of decimals.
pub fn format_value(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Split a folder name at its last `_` into variable name and value text.
pub fn split_folder_name(name: &str) -> Option<(&str, &str)> {
    let (variable, value) = name.rsplit_once('_')?;
    if variable.is_empty() || value.is_empty() {
        return None;
    }
    Some((variable, value))
}

/// One scanned variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanAxis {
    /// Variable name as used in folder names.
    pub name: String,
    /// Sorted unique values.
    pub values: Vec<f64>,
    /// Decimal places used in folder names.
    pub decimals: usize,
}

impl ScanAxis {
    /// Build an axis from `(variable, value text)` pairs in sorted folder order.
    ///
    /// The precision comes from the first pair.
    pub fn from_entries(entries: &[(String, String)]) -> Result<Self> {
        let (name, first_value) = entries
            .first()
            .ok_or_else(|| FarError::invalid_scan("no scan folders found"))?;
        let decimals = infer_decimals(first_value);

        let mut values = Vec::with_capacity(entries.len());
        for (variable, text) in entries {
            if variable != name {
                return Err(FarError::invalid_scan(format!(
                    "folders mix scan variables '{}' and '{}'",
                    name, variable
                )));
            }
            if infer_decimals(text) != decimals {
                warn!(
                    "Folder {}_{} does not use {} decimals; its path will not be reconstructed",
                    variable, text, decimals
                );
            }
            if let Ok(value) = text.parse::<f64>() {
                values.push(value);
            }
        }
        values.sort_by(f64::total_cmp);
        values.dedup();

        Ok(Self {
            name: name.clone(),
            values,
            decimals,
        })
    }

    /// Discover an axis from the subdirectories of `dir`.
    ///
    /// Entries not starting with `prefix` are ignored and the prefix is
    /// stripped before splitting.
    pub fn discover(dir: &Path, prefix: Option<&str>) -> Result<Self> {
        let entries = folder_entries(dir, prefix)?;
        Self::from_entries(&entries)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the axis has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value text with the axis precision.
    pub fn format_value(&self, value: f64) -> String {
        format_value(value, self.decimals)
    }

    /// Folder name of the `index`-th value, without prefix.
    pub fn folder_name(&self, index: usize) -> String {
        format!("{}_{}", self.name, self.format_value(self.values[index]))
    }
}

/// `(variable, value text)` of every matching subdirectory, sorted by folder name.
pub fn folder_entries(dir: &Path, prefix: Option<&str>) -> Result<Vec<(String, String)>> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .map_err(|e| FarError::file_open(dir, e))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();

    let mut entries = Vec::new();
    for name in &names {
        let stripped = match prefix {
            Some(prefix) => match name.strip_prefix(prefix) {
                Some(rest) => rest,
                None => {
                    debug!("Skipping {}: no prefix {}", name, prefix);
                    continue;
                }
            },
            None => name.as_str(),
        };
        match split_folder_name(stripped) {
            Some((variable, value)) if value.parse::<f64>().is_ok() => {
                entries.push((variable.to_string(), value.to_string()));
            }
            _ => debug!("Skipping {}: not a <name>_<value> folder", name),
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(names: &[&str]) -> Vec<(String, String)> {
        names
            .iter()
            .filter_map(|n| split_folder_name(n))
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn decimals_follow_the_decimal_exponent() {
        assert_eq!(infer_decimals("0.010"), 3);
        assert_eq!(infer_decimals("1e-3"), 3);
        assert_eq!(infer_decimals("1.5e2"), 1);
        assert_eq!(infer_decimals("100"), 0);
        assert_eq!(infer_decimals("-0.50"), 2);
    }

    #[test]
    fn beta_scan_round_trips_folder_names() {
        let axis = ScanAxis::from_entries(&entries(&["beta_0.001", "beta_0.010", "beta_0.100"]))
            .unwrap();
        assert_eq!(axis.decimals, 3);
        assert_eq!(axis.values, vec![0.001, 0.01, 0.1]);
        assert_eq!(axis.format_value(0.01), "0.010");
        assert_eq!(axis.folder_name(1), "beta_0.010");
    }

    #[test]
    fn names_split_at_last_underscore() {
        assert_eq!(split_folder_name("bet0_f_0.5"), Some(("bet0_f", "0.5")));
        assert_eq!(split_folder_name("plain"), None);
        assert_eq!(split_folder_name("_1.0"), None);
    }

    #[test]
    fn values_sort_numerically() {
        let axis = ScanAxis::from_entries(&entries(&["x_10", "x_9", "x_9"])).unwrap();
        assert_eq!(axis.values, vec![9.0, 10.0]);
    }

    #[test]
    fn mixed_variables_are_rejected() {
        let err = ScanAxis::from_entries(&entries(&["a_1", "b_2"])).unwrap_err();
        assert!(matches!(err, FarError::InvalidScan(_)));
    }

    #[test]
    fn discovery_filters_and_strips_prefix() {
        let dir = TempDir::new().unwrap();
        for name in ["41091_bet0_f_0.20", "41091_bet0_f_0.10", "other_bet0_f_0.30", "41091_notes"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("41091_bet0_f_0.40"), "a file").unwrap();
        let axis = ScanAxis::discover(dir.path(), Some("41091_")).unwrap();
        assert_eq!(axis.name, "bet0_f");
        assert_eq!(axis.values, vec![0.1, 0.2]);
        assert_eq!(axis.decimals, 2);
    }
}
