//! # Host Range Expansion
//!
//! Inventory host entries may describe many hosts at once with bracketed
//! ranges, e.g. `web-[01:20].example.com` or `db-[a:f]`.
//!
//! Supported range bodies:
//! * **Numeric**: `start:end` or `start:end:step`. Values are zero-padded to the
//!   width of the longer bound. An empty start (`[:05]`) means `0`.
//! * **Alphabetic**: single letters, ordered over `a..z` followed by `A..Z`.
//!
//! Several ranges in one pattern expand into their cross product.

use crate::error::ParseError;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A single parsed `[start:end:step]` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRange {
    Numeric {
        start: u64,
        end: u64,
        step: u64,
        width: usize,
    },
    Alphabetic {
        start: usize,
        end: usize,
        step: usize,
    },
}

impl HostRange {
    /// Parses the text between the brackets.
    pub fn parse(body: &str) -> Result<Self, String> {
        let bounds: Vec<&str> = body.split(':').collect();
        if bounds.len() < 2 || bounds.len() > 3 {
            return Err(format!("expected 'start:end' or 'start:end:step', got '{body}'"));
        }

        let step: usize = match bounds.get(2) {
            Some(raw) => raw
                .parse::<usize>()
                .ok()
                .filter(|step| *step > 0)
                .ok_or_else(|| format!("invalid step '{raw}'"))?,
            None => 1,
        };

        let end = bounds[1];
        let start = match bounds[0] {
            "" if is_number(end) => "0",
            "" => return Err("omitting the range start is only allowed in numeric ranges".into()),
            start => start,
        };

        if is_number(start) && is_number(end) {
            let parse = |bound: &str| {
                bound
                    .parse::<u64>()
                    .map_err(|e| format!("invalid bound '{bound}': {e}"))
            };
            return Ok(HostRange::Numeric {
                start: parse(start)?,
                end: parse(end)?,
                step: step as u64,
                width: start.len().max(end.len()),
            });
        }

        match (alphabet_index(start), alphabet_index(end)) {
            (Some(start), Some(end)) => Ok(HostRange::Alphabetic { start, end, step }),
            _ => Err(format!("bounds '{start}' and '{end}' do not form a numeric or alphabetic range")),
        }
    }

    /// Every value of the range, already formatted.
    pub fn values(&self) -> Vec<String> {
        match *self {
            HostRange::Numeric {
                start,
                end,
                step,
                width,
            } => (start..=end)
                .step_by(step as usize)
                .map(|n| format!("{n:0width$}"))
                .collect(),
            HostRange::Alphabetic { start, end, step } => (start..=end)
                .step_by(step)
                .map(|idx| char::from(ALPHABET[idx]).to_string())
                .collect(),
        }
    }
}

/// Expands a host pattern into the flat list of host names it describes.
///
/// A pattern without brackets expands to itself.
pub fn expand_host_pattern(pattern: &str) -> Result<Vec<String>, ParseError> {
    let Some(open) = pattern.find('[') else {
        if pattern.contains(']') {
            return Err(ParseError::host_pattern(pattern, "unbalanced ']'"));
        }
        return Ok(vec![pattern.to_string()]);
    };

    let Some(close) = pattern[open..].find(']').map(|idx| open + idx) else {
        return Err(ParseError::host_pattern(pattern, "unbalanced '['"));
    };

    let head = &pattern[..open];
    if head.contains(']') {
        return Err(ParseError::host_pattern(pattern, "unbalanced ']'"));
    }
    let body = &pattern[open + 1..close];
    let tail = &pattern[close + 1..];

    let values = HostRange::parse(body)
        .map_err(|reason| ParseError::host_pattern(pattern, reason))?
        .values();
    if values.is_empty() {
        return Err(ParseError::host_pattern(pattern, format!("range [{body}] is empty")));
    }

    // Report errors from nested ranges against the whole pattern.
    let tails = expand_host_pattern(tail).map_err(|err| match err {
        ParseError::InvalidHostPattern { reason, .. } => ParseError::host_pattern(pattern, reason),
        other => other,
    })?;

    let mut hosts = Vec::with_capacity(values.len() * tails.len());
    for value in &values {
        for tail in &tails {
            hosts.push(format!("{head}{value}{tail}"));
        }
    }
    Ok(hosts)
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn alphabet_index(s: &str) -> Option<usize> {
    match s.as_bytes() {
        [c] => ALPHABET.iter().position(|a| a == c),
        _ => None,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
