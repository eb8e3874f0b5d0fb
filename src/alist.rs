//! Alist file format adapter.
//!
//! This module is a thin, I/O-free adapter between the text-based alist
//! format (MacKay's convention for sparse parity-check matrices) and
//! [`ParityCheckCode`]. It owns no simulation logic: it only converts
//! between a `&str` and a `ParityCheckCode`, and back.
//!
//! The alist layout, for a code with `n` variable nodes and `m` check
//! nodes, is:
//! ```text
//! n m
//! <max variable degree> <max check degree>
//! <degree of variable 0> <degree of variable 1> ... (n numbers)
//! <degree of check 0> <degree of check 1> ... (m numbers)
//! <1-indexed checks incident to variable 0, zero-padded to max degree>
//! ... (n lines)
//! <1-indexed variables incident to check 0, zero-padded to max degree>
//! ... (m lines)
//! ```

use crate::code::ParityCheckCode;
use crate::error::IoError;
use std::fmt::Write as _;

/// Parses an alist-formatted string into a [`ParityCheckCode`].
pub fn parse(alist: &str) -> Result<ParityCheckCode, IoError> {
    let err = |msg: &str| IoError::ParseAlist(msg.to_string());
    let mut lines = alist.lines();

    let mut sizes = lines
        .next()
        .ok_or_else(|| err("missing size header line"))?
        .split_whitespace();
    let n: usize = sizes
        .next()
        .ok_or_else(|| err("size header missing n"))?
        .parse()
        .map_err(|_| err("n is not a number"))?;
    let m: usize = sizes
        .next()
        .ok_or_else(|| err("size header missing m"))?
        .parse()
        .map_err(|_| err("m is not a number"))?;

    lines.next().ok_or_else(|| err("missing max-degree line"))?;
    lines
        .next()
        .ok_or_else(|| err("missing variable degree line"))?;
    lines.next().ok_or_else(|| err("missing check degree line"))?;

    let mut var_checks: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut check_vars: Vec<Vec<usize>> = vec![Vec::new(); m];
    for v in 0..n {
        let line = lines
            .next()
            .ok_or_else(|| err("fewer variable adjacency lines than n"))?;
        for tok in line.split_whitespace() {
            let c: usize = tok.parse().map_err(|_| err("adjacency entry not a number"))?;
            // zero is padding for variables of degree below the column max
            if c == 0 {
                continue;
            }
            let c = c - 1;
            if c >= m {
                return Err(err("check index out of range"));
            }
            var_checks[v].push(c);
            check_vars[c].push(v);
        }
    }
    // The check adjacency rows (if present) are redundant with the variable
    // columns we've already parsed and derived check_vars from; we don't
    // need to read them.

    Ok(ParityCheckCode::from_adjacency(var_checks, check_vars))
}

/// Serializes a [`ParityCheckCode`] to the alist format, zero-padding
/// irregular degrees as MacKay's original format does.
pub fn write(code: &ParityCheckCode) -> String {
    let n = code.n();
    let m = code.m();
    let max_var_degree = (0..n).map(|v| code.var_checks(v).len()).max().unwrap_or(0);
    let max_check_degree = (0..m).map(|c| code.check_vars(c).len()).max().unwrap_or(0);

    let mut s = String::new();
    writeln!(s, "{n} {m}").unwrap();
    writeln!(s, "{max_var_degree} {max_check_degree}").unwrap();
    write_degrees(&mut s, (0..n).map(|v| code.var_checks(v).len()));
    write_degrees(&mut s, (0..m).map(|c| code.check_vars(c).len()));
    for v in 0..n {
        write_padded_row(&mut s, code.var_checks(v), max_var_degree);
    }
    for c in 0..m {
        write_padded_row(&mut s, code.check_vars(c), max_check_degree);
    }
    s
}

fn write_degrees<I: Iterator<Item = usize>>(s: &mut String, degrees: I) {
    let mut degrees = degrees.peekable();
    while let Some(d) = degrees.next() {
        write!(s, "{d}").unwrap();
        if degrees.peek().is_some() {
            write!(s, " ").unwrap();
        }
    }
    writeln!(s).unwrap();
}

fn write_padded_row(s: &mut String, indices: &[usize], width: usize) {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    for (i, &idx) in sorted.iter().enumerate() {
        if i > 0 {
            write!(s, " ").unwrap();
        }
        write!(s, "{}", idx + 1).unwrap();
    }
    for i in sorted.len()..width.max(1) {
        if i > 0 || !sorted.is_empty() {
            write!(s, " ").unwrap();
        }
        write!(s, "0").unwrap();
    }
    writeln!(s).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repetition_code() -> ParityCheckCode {
        ParityCheckCode::from_adjacency(vec![vec![0], vec![0], vec![0]], vec![vec![0, 1, 2]])
    }

    #[test]
    fn parse_basic() {
        let alist = "3 1\n1 3\n1 1 1\n3\n1\n1\n1\n1 2 3\n";
        let code = parse(alist).unwrap();
        assert_eq!(code.n(), 3);
        assert_eq!(code.m(), 1);
        for v in 0..3 {
            assert_eq!(code.var_checks(v), &[0]);
        }
        assert_eq!(code.check_vars(0), &[0, 1, 2]);
    }

    #[test]
    fn round_trip() {
        let code = repetition_code();
        let text = write(&code);
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed, code);
        // Reserializing the parsed code must reproduce the same bytes.
        assert_eq!(write(&parsed), text);
    }

    #[test]
    fn parse_rejects_truncated_input() {
        assert!(parse("3 1").is_err());
    }

    #[test]
    fn parse_rejects_out_of_range_index() {
        let alist = "3 1\n1 3\n1 1 1\n3\n5\n1\n1\n1 2 3\n";
        assert!(parse(alist).is_err());
    }
}
