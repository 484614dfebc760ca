//! Percentage arithmetic used by the lesson screens that consume a tally.

/// Percentage `part` represents of `whole`. `None` when `whole` is zero.
#[must_use]
pub fn percentage_of(part: u32, whole: u32) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some(f64::from(part) * 100.0 / f64::from(whole))
}

/// Value that `percent` percent of `whole` amounts to.
#[must_use]
pub fn part_from_percentage(percent: f64, whole: u32) -> f64 {
    percent * f64::from(whole) / 100.0
}

/// Whole that `part` is `percent` percent of. `None` unless `percent` is positive.
#[must_use]
pub fn whole_from_percentage(part: u32, percent: f64) -> Option<f64> {
    if percent <= 0.0 || !percent.is_finite() {
        return None;
    }
    Some(f64::from(part) * 100.0 / percent)
}

/// Relative change from `from` to `to`, in percent. `None` when `from` is zero.
#[must_use]
pub fn percentage_difference(from: u32, to: u32) -> Option<f64> {
    if from == 0 {
        return None;
    }
    Some((f64::from(to) - f64::from(from)) * 100.0 / f64::from(from))
}
