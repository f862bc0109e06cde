//! WebVTT cue parsing
//!
//! Word-level transcripts arrive as WebVTT with one cue per word. Cues whose
//! payload is empty or only spaces are kept: they mark pauses and feed
//! [`CueIndex::long_pauses`](crate::cue::CueIndex::long_pauses).

use crate::cue::Cue;
use crate::error::{EngineError, Result};

/// Parse a WebVTT document into cues, in document order
///
/// Payload lines are kept verbatim and joined with `\n`, so a cue holding
/// only spaces is a pause like an empty one. An empty line ends the payload
/// only when what follows is the next cue (its timing line, or an identifier
/// right before it), a `NOTE`/`STYLE`/`REGION` block, or the end of the
/// document. Any other empty line belongs to the payload.
pub fn parse_vtt(content: &str) -> Result<Vec<Cue>> {
    let lines: Vec<&str> = content.lines().collect();
    let mut cues = Vec::new();
    let mut current: Option<Cue> = None;
    let mut payload_closed = false;

    for (line_no, line) in lines.iter().copied().enumerate() {
        let trimmed = line.trim();
        if current.is_none() && trimmed.trim_start_matches('\u{FEFF}').starts_with("WEBVTT") {
            continue;
        }

        if is_timing_line(trimmed) {
            let (start, end) = parse_timing_line(trimmed).map_err(|reason| {
                EngineError::malformed(format!("line {}: {}", line_no + 1, reason))
            })?;
            if let Some(cue) = current.take() {
                cues.push(cue);
            }
            current = Some(Cue::new(start, end, String::new()));
            payload_closed = false;
            continue;
        }

        let Some(cue) = current.as_mut() else {
            continue;
        };
        if payload_closed {
            continue;
        }
        if line.is_empty() {
            if cue.text.is_empty() {
                continue;
            }
            if ends_payload(&lines[line_no + 1..]) {
                payload_closed = true;
            } else {
                cue.text.push('\n');
            }
            continue;
        }
        if !cue.text.is_empty() {
            cue.text.push('\n');
        }
        cue.text.push_str(line);
    }

    if let Some(cue) = current {
        cues.push(cue);
    }
    Ok(cues)
}

fn is_timing_line(trimmed: &str) -> bool {
    trimmed.contains("-->")
}

/// Whether an empty line followed by `rest` separates the current cue from
/// what comes next
fn ends_payload(rest: &[&str]) -> bool {
    let Some(next) = rest.iter().position(|l| !l.trim().is_empty()) else {
        return true;
    };
    let line = rest[next].trim();
    if is_timing_line(line) || ["NOTE", "STYLE", "REGION"].iter().any(|b| line.starts_with(b)) {
        return true;
    }
    // Cue identifier sits directly above its timing line
    rest.get(next + 1).map_or(false, |l| is_timing_line(l.trim()))
}

/// Parse `start --> end [settings]`
fn parse_timing_line(line: &str) -> std::result::Result<(f64, f64), String> {
    let (left, right) = line
        .split_once("-->")
        .ok_or_else(|| "missing '-->'".to_string())?;
    let start = parse_timestamp(left.trim())?;
    // Cue settings may follow the end timestamp
    let end_token = right.split_whitespace().next().unwrap_or("");
    let end = parse_timestamp(end_token)?;
    Ok((start, end))
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm` into seconds
fn parse_timestamp(token: &str) -> std::result::Result<f64, String> {
    let invalid = || format!("invalid timestamp '{}'", token);

    let (clock, millis) = token.split_once('.').ok_or_else(invalid)?;
    if millis.len() != 3 {
        return Err(invalid());
    }
    let millis: u32 = millis.parse().map_err(|_| invalid())?;

    let parts: Vec<u32> = clock
        .split(':')
        .map(|p| p.parse::<u32>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| invalid())?;
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (*h, *m, *s),
        [m, s] => (0, *m, *s),
        _ => return Err(invalid()),
    };
    if minutes > 59 || seconds > 59 {
        return Err(invalid());
    }

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds as f64 + millis as f64 / 1000.0)
}
