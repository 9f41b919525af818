//! Positional decoder and encoder for `Input_Model`.

use super::record::{NamelistRecord, NamelistValue};
use super::schema::{FieldKind, FieldSpec, VectorLen, NAMELIST_SCHEMA};
use crate::error::{FarError, Result};
use crate::tokens::{format_fortran_bool, parse_fortran_bool, read_numbers, LineReader};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

/// Decode a namelist, skipping `header` leading lines first.
pub fn decode<R: BufRead>(reader: &mut LineReader<R>, header: usize) -> Result<NamelistRecord> {
    reader.skip_lines(header, "namelist header")?;
    let mut record = NamelistRecord::empty();
    for (index, spec) in NAMELIST_SCHEMA.iter().enumerate() {
        reader.skip_lines(spec.leading_lines(), spec.name)?;
        let value = decode_value(reader, spec, &record)?;
        record.set_at(index, value);
    }
    Ok(record)
}

fn decode_value<R: BufRead>(
    reader: &mut LineReader<R>,
    spec: &FieldSpec,
    record: &NamelistRecord,
) -> Result<NamelistValue> {
    let value = match spec.kind {
        FieldKind::Int => NamelistValue::Int(reader.parse_line(spec.name, "an integer")?),
        FieldKind::Float => NamelistValue::Float(reader.parse_line(spec.name, "a float")?),
        FieldKind::Bool => {
            let text = reader.expect_line(spec.name)?.to_string();
            let value = parse_fortran_bool(&text).ok_or_else(|| {
                FarError::parse(spec.name, reader.line_number(), text.trim(), "a logical")
            })?;
            NamelistValue::Bool(value)
        }
        FieldKind::Text => NamelistValue::Text(reader.expect_line(spec.name)?.trim().to_string()),
        FieldKind::IntVector(len) => {
            let n = vector_len(len, record, spec.name)?;
            NamelistValue::IntVector(read_vector(reader, n, spec.name)?)
        }
        FieldKind::FloatVector(len) => {
            let n = vector_len(len, record, spec.name)?;
            NamelistValue::FloatVector(read_vector(reader, n, spec.name)?)
        }
    };
    Ok(value)
}

// A zero-length vector still occupies one (blank) value line.
fn read_vector<T, R>(reader: &mut LineReader<R>, n: usize, name: &str) -> Result<Vec<T>>
where
    T: FromStr + Clone,
    R: BufRead,
{
    if n > 0 {
        return read_numbers(reader, n, name);
    }
    let line = reader.expect_line(name)?.to_string();
    if line.split(',').any(|token| !token.trim().is_empty()) {
        return Err(FarError::Desynchronized {
            line: reader.line_number(),
            message: format!("{} should be empty, found '{}'", name, line.trim()),
        });
    }
    Ok(Vec::new())
}

fn vector_len(len: VectorLen, record: &NamelistRecord, name: &str) -> Result<usize> {
    match len {
        VectorLen::Fixed(n) => Ok(n),
        VectorLen::Field(source) => {
            let raw = record.int(source).ok_or_else(|| FarError::MissingField {
                name: source.to_string(),
            })?;
            usize::try_from(raw).map_err(|_| FarError::FieldType {
                name: name.to_string(),
                expected: format!("a non-negative length in '{}', got {}", source, raw),
            })
        }
    }
}

/// Read a namelist file.
pub fn read_namelist(path: &Path, header: usize) -> Result<NamelistRecord> {
    let file = File::open(path).map_err(|e| FarError::file_open(path, e))?;
    let mut reader = LineReader::new(BufReader::new(file));
    let record = decode(&mut reader, header)?;
    tracing::debug!(
        "Read namelist {} ({} lines)",
        path.display(),
        reader.line_number()
    );
    Ok(record)
}

/// Encode a complete record. Every field must be set.
pub fn encode<W: Write>(record: &NamelistRecord, writer: &mut W) -> Result<()> {
    for (index, spec) in NAMELIST_SCHEMA.iter().enumerate() {
        let value = record.at(index).ok_or_else(|| FarError::MissingField {
            name: spec.name.to_string(),
        })?;
        if !value.matches(spec.kind) {
            return Err(FarError::FieldType {
                name: spec.name.to_string(),
                expected: spec.kind.name().to_string(),
            });
        }
        check_vector_len(spec, value, record)?;
        if let NamelistValue::Text(text) = value {
            if text.contains(&['\n', '\r'][..]) {
                return Err(FarError::FieldType {
                    name: spec.name.to_string(),
                    expected: "single-line text".to_string(),
                });
            }
        }
        for line in spec.preamble {
            writeln!(writer, "{}", line)?;
        }
        writeln!(writer, "! {}", spec.name)?;
        writeln!(writer, "{}", format_value(value))?;
    }
    Ok(())
}

fn check_vector_len(spec: &FieldSpec, value: &NamelistValue, record: &NamelistRecord) -> Result<()> {
    let (len, actual) = match (spec.kind, value) {
        (FieldKind::IntVector(len), NamelistValue::IntVector(v)) => (len, v.len()),
        (FieldKind::FloatVector(len), NamelistValue::FloatVector(v)) => (len, v.len()),
        _ => return Ok(()),
    };
    let expected = vector_len(len, record, spec.name)?;
    if expected != actual {
        return Err(FarError::ShapeMismatch(format!(
            "field '{}' holds {} values, schema expects {}",
            spec.name, actual, expected
        )));
    }
    Ok(())
}

fn format_value(value: &NamelistValue) -> String {
    match value {
        NamelistValue::Int(v) => v.to_string(),
        NamelistValue::Float(v) => format!("{:.9e}", v),
        NamelistValue::Bool(v) => format_fortran_bool(*v).to_string(),
        NamelistValue::Text(v) => v.clone(),
        NamelistValue::IntVector(values) => {
            let mut line = String::new();
            for v in values {
                let _ = write!(line, "{},", v);
            }
            line
        }
        NamelistValue::FloatVector(values) => {
            let mut line = String::new();
            for v in values {
                let _ = write!(line, "{:.9e},", v);
            }
            line
        }
    }
}

/// Write a complete record to a file.
pub fn write_namelist(record: &NamelistRecord, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| FarError::file_open(path, e))?;
    let mut writer = BufWriter::new(file);
    encode(record, &mut writer)?;
    writer.flush()?;
    Ok(())
}
