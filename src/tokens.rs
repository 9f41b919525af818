//! Line-oriented numeric token reading.
//!
//! FAR3D writes its inputs with Fortran list-directed output, so a vector may
//! span several lines, use `count*value` repeat tokens and end with a stray
//! comma.

use crate::error::{FarError, Result};
use std::io::BufRead;
use std::str::FromStr;

/// A line stream that remembers how many lines it has consumed.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    line: usize,
    buffer: String,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap a buffered reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            buffer: String::new(),
        }
    }

    /// Number of lines consumed so far (1-based number of the last line read).
    pub fn line_number(&self) -> usize {
        self.line
    }

    /// Next line without its trailing newline, `None` at end of stream.
    pub fn next_line(&mut self) -> Result<Option<&str>> {
        self.buffer.clear();
        let read = self.inner.read_line(&mut self.buffer)?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;
        let trimmed = self.buffer.trim_end_matches(&['\n', '\r'][..]);
        Ok(Some(trimmed))
    }

    /// Next line, failing with `UnexpectedEof` naming `context`.
    pub fn expect_line(&mut self, context: &str) -> Result<&str> {
        let line = self.line;
        match self.next_line()? {
            Some(text) => Ok(text),
            None => Err(FarError::eof(context, line)),
        }
    }

    /// Discard `count` lines.
    pub fn skip_lines(&mut self, count: usize, context: &str) -> Result<()> {
        for _ in 0..count {
            self.expect_line(context)?;
        }
        Ok(())
    }

    /// Parse the whole trimmed next line as `T`.
    pub fn parse_line<T: FromStr>(&mut self, context: &str, expected: &'static str) -> Result<T> {
        let text = self.expect_line(context)?.trim().to_string();
        text.parse::<T>()
            .map_err(|_| FarError::parse(context, self.line, text, expected))
    }

    /// Collect every remaining line.
    pub fn remaining_lines(&mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line()? {
            lines.push(line.to_string());
        }
        Ok(lines)
    }
}

/// Expand one comma-separated token into values.
///
/// Returns `None` for tokens that are neither a number nor a `count*value`
/// repeat; those are skipped by the caller.
fn expand_token<T: FromStr + Clone>(token: &str) -> Option<Vec<T>> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    match token.split_once('*') {
        Some((count, value)) => {
            let count = count.trim().parse::<usize>().ok()?;
            let value = value.trim().parse::<T>().ok()?;
            Some(vec![value; count])
        }
        None => token.parse::<T>().ok().map(|value| vec![value]),
    }
}

/// Read exactly `n` values, consuming as many lines as needed.
pub fn read_numbers<T, R>(reader: &mut LineReader<R>, n: usize, context: &str) -> Result<Vec<T>>
where
    T: FromStr + Clone,
    R: BufRead,
{
    let mut values = Vec::with_capacity(n);
    while values.len() < n {
        let line = reader.expect_line(context)?.to_string();
        for token in line.split(',') {
            let Some(expanded) = expand_token::<T>(token) else {
                continue;
            };
            if values.len() + expanded.len() > n {
                return Err(FarError::Desynchronized {
                    line: reader.line_number(),
                    message: format!(
                        "{} holds more than the {} values expected",
                        context, n
                    ),
                });
            }
            values.extend(expanded);
        }
    }
    Ok(values)
}

/// Parse a Fortran logical literal.
pub fn parse_fortran_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        ".true." => Some(true),
        ".false." => Some(false),
        _ => None,
    }
}

/// Render a Fortran logical literal.
pub fn format_fortran_bool(value: bool) -> &'static str {
    if value {
        ".true."
    } else {
        ".false."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(text: &str) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn reads_across_lines_and_expands_repeats() {
        let mut r = reader("1, 2,\n3*0, 4,\nnext\n");
        let values: Vec<i64> = read_numbers(&mut r, 6, "mm").unwrap();
        assert_eq!(values, vec![1, 2, 0, 0, 0, 4]);
        assert_eq!(r.line_number(), 2);
        assert_eq!(r.next_line().unwrap(), Some("next"));
    }

    #[test]
    fn stray_tokens_are_skipped() {
        let mut r = reader(" 1.5, junk, ,2.5e-3,\n");
        let values: Vec<f64> = read_numbers(&mut r, 2, "cnep").unwrap();
        assert_eq!(values, vec![1.5, 2.5e-3]);
    }

    #[test]
    fn exhausted_stream_is_an_error() {
        let mut r = reader("1, 2,\n");
        let err = read_numbers::<i64, _>(&mut r, 3, "nn").unwrap_err();
        assert!(matches!(err, FarError::UnexpectedEof { .. }));
    }

    #[test]
    fn overrun_is_a_desynchronisation() {
        let mut r = reader("1, 2, 3,\n");
        let err = read_numbers::<i64, _>(&mut r, 2, "nn").unwrap_err();
        assert!(matches!(err, FarError::Desynchronized { .. }));
    }

    #[test]
    fn fortran_booleans() {
        assert_eq!(parse_fortran_bool(" .TRUE.\n"), Some(true));
        assert_eq!(parse_fortran_bool(".false."), Some(false));
        assert_eq!(parse_fortran_bool("yes"), None);
        assert_eq!(format_fortran_bool(false), ".false.");
    }
}
