//! Utilities for chart views

pub mod colors;

// Re-export commonly used items
pub use colors::{viridis_color, with_opacity, Theme};

/// Min and max of the finite values in a sequence, `None` when there are none
pub fn extent<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values.into_iter().filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Widen a range by 5% on each side so marks on its ends stay inside the
/// plot. A single value gets half a unit on each side.
pub fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi > lo {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    } else {
        (lo - 0.5, lo + 0.5)
    }
}

/// Plot position of a count on a value axis. Counts below 1 sit at 1.
pub fn count_position(count: u64, log: bool) -> f64 {
    let value = (count as f64).max(1.0);
    if log {
        value.log10()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent() {
        assert_eq!(extent([3.0, 1.0, f64::NAN, 7.0]), Some((1.0, 7.0)));
        assert_eq!(extent(Vec::new()), None);
    }

    #[test]
    fn test_padded() {
        assert_eq!(padded((0.0, 100.0)), (-5.0, 105.0));
        assert_eq!(padded((4.0, 4.0)), (3.5, 4.5));
    }

    #[test]
    fn test_count_position() {
        assert_eq!(count_position(0, false), 1.0);
        assert_eq!(count_position(40, false), 40.0);
        assert_eq!(count_position(100, true), 2.0);
        assert_eq!(count_position(0, true), 0.0);
    }
}
