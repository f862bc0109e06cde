//! Relative-time mapping
//!
//! "Relative" time is absolute time with all preceding strikethrough
//! coverage subtracted, i.e. the timeline as heard when muted spans are
//! skipped. Everything here is a pure function over a snapshot of strike
//! `(start, end)` pairs.
//!
//! [`to_relative`] does not deduplicate: if two strikes overlap, the shared
//! span is subtracted twice. Callers that may hold overlapping strikes
//! should pass the output of [`merge_intervals`] instead of raw records.

/// Map an absolute time to relative time
///
/// Strikes may be given in any order.
pub fn to_relative(abs_time: f64, strikes: &[(f64, f64)]) -> f64 {
    let mut subtracted = 0.0;
    for &(start, end) in strikes {
        if abs_time > end {
            subtracted += end - start;
        } else if abs_time > start {
            subtracted += abs_time - start;
        }
    }
    abs_time - subtracted
}

/// Map a relative time back to absolute time
///
/// `strikes` must be disjoint (see [`merge_intervals`]). A relative time
/// that lands on a strike boundary maps to the end of that strike, since
/// the muted span occupies no relative time.
pub fn to_absolute(rel_time: f64, strikes: &[(f64, f64)]) -> f64 {
    let mut sorted = strikes.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut abs_time = rel_time;
    for (start, end) in sorted {
        if start <= abs_time {
            abs_time += end - start;
        } else {
            break;
        }
    }
    abs_time
}

/// Relative length of the span `[start, end]`
///
/// An inverted range is normalized first.
pub fn relative_duration(start: f64, end: f64, strikes: &[(f64, f64)]) -> f64 {
    let (start, end) = (start.min(end), start.max(end));
    to_relative(end, strikes) - to_relative(start, strikes)
}

/// Relative length of `[start, end]` with strikes clipped to the span and
/// unioned before subtraction, so overlapping strikes count once
///
/// Used for per-highlight duration figures. Never negative; an empty or
/// inverted span has zero duration.
pub fn clipped_relative_duration(start: f64, end: f64, strikes: &[(f64, f64)]) -> f64 {
    let absolute = end - start;
    if absolute <= 0.0 {
        return 0.0;
    }

    let clipped: Vec<(f64, f64)> = strikes
        .iter()
        .filter(|&&(s, e)| s < end && e > start)
        .map(|&(s, e)| (s.max(start), e.min(end)))
        .collect();

    let reduction: f64 = merge_intervals(&clipped).iter().map(|(s, e)| e - s).sum();
    (absolute - reduction).max(0.0)
}

/// Sort and union `(start, end)` pairs into a minimal disjoint cover
///
/// Touching pairs are joined.
pub fn merge_intervals(pairs: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut sorted = pairs.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(sorted.len());
    for (start, end) in sorted {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// [`merge_intervals`] over a flat `[s0, e0, s1, e1, ...]` sequence
///
/// A trailing unpaired value is ignored.
pub fn merge_strike_intervals(flat_pairs: &[f64]) -> Vec<(f64, f64)> {
    let pairs: Vec<(f64, f64)> = flat_pairs
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();
    merge_intervals(&pairs)
}

/// Where playback should jump when skipping muted spans
///
/// Returns the end of the strike containing `playhead` (`start <= t < end`),
/// or `None` if the playhead is not inside a strike.
pub fn skip_target(playhead: f64, strikes: &[(f64, f64)]) -> Option<f64> {
    strikes
        .iter()
        .find(|&&(start, end)| playhead >= start && playhead < end)
        .map(|&(_, end)| end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_relative_single_strike() {
        let strikes = [(2.0, 5.0)];
        assert_eq!(to_relative(0.0, &strikes), 0.0);
        assert_eq!(to_relative(2.0, &strikes), 2.0);
        assert_eq!(to_relative(3.0, &strikes), 2.0);
        assert_eq!(to_relative(5.0, &strikes), 2.0);
        assert_eq!(to_relative(10.0, &strikes), 7.0);
    }

    #[test]
    fn test_relative_duration_with_full_mute() {
        assert_eq!(relative_duration(0.0, 10.0, &[(2.0, 5.0)]), 7.0);
        assert_eq!(relative_duration(10.0, 0.0, &[(2.0, 5.0)]), 7.0);
    }

    #[test]
    fn test_to_relative_order_independent() {
        let a = [(1.0, 2.0), (6.0, 8.0)];
        let b = [(6.0, 8.0), (1.0, 2.0)];
        assert_eq!(to_relative(9.0, &a), to_relative(9.0, &b));
        assert_eq!(to_relative(9.0, &a), 6.0);
    }

    #[test]
    fn test_overlapping_strikes_double_count() {
        // Known behaviour: raw overlapping strikes subtract the shared span twice.
        let raw = [(2.0, 6.0), (4.0, 8.0)];
        assert_eq!(to_relative(10.0, &raw), 2.0);
        assert_eq!(to_relative(10.0, &merge_intervals(&raw)), 4.0);
    }

    #[test]
    fn test_to_absolute_inverts_to_relative() {
        let strikes = merge_intervals(&[(2.0, 5.0), (7.0, 8.0)]);
        for abs in [0.0, 1.5, 5.5, 6.9, 8.0, 12.0] {
            let rel = to_relative(abs, &strikes);
            assert_eq!(to_absolute(rel, &strikes), abs);
        }
        // Muted span collapses onto its end
        assert_eq!(to_absolute(2.0, &strikes), 5.0);
    }

    #[test]
    fn test_clipped_relative_duration() {
        let strikes = [(1.0, 3.0), (2.0, 4.0), (9.0, 12.0)];
        // Clipped to [0, 10]: union [1,4] and [9,10] => 4 seconds muted
        assert_eq!(clipped_relative_duration(0.0, 10.0, &strikes), 6.0);
        assert_eq!(clipped_relative_duration(5.0, 5.0, &strikes), 0.0);
        assert_eq!(clipped_relative_duration(1.5, 3.5, &strikes), 0.0);
    }

    #[test]
    fn test_merge_strike_intervals() {
        let merged = merge_strike_intervals(&[5.0, 7.0, 0.0, 2.0, 1.0, 3.0, 7.0, 8.0, 42.0]);
        assert_eq!(merged, vec![(0.0, 3.0), (5.0, 8.0)]);
        assert!(merge_strike_intervals(&[]).is_empty());
    }

    #[test]
    fn test_skip_target() {
        let strikes = [(2.0, 5.0)];
        assert_eq!(skip_target(2.0, &strikes), Some(5.0));
        assert_eq!(skip_target(4.9, &strikes), Some(5.0));
        assert_eq!(skip_target(5.0, &strikes), None);
        assert_eq!(skip_target(1.0, &strikes), None);
    }
}
