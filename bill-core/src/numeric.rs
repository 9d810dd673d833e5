//! Small numeric helpers shared by the tariff and reconciliation code.

/// Round to the nearest whole currency unit.
pub fn round_currency(value: f64) -> f64 {
    value.round()
}

/// `part / whole` of `amount`.
pub fn share_of(part: f64, whole: f64, amount: f64) -> f64 {
    part / whole * amount
}

pub fn percentage_of(part: f64, whole: f64) -> f64 {
    part / whole * 100.0
}

/// Round every value to a whole unit so that the rounded values sum to `target`.
///
/// Values are floored first and the missing units go to the largest fractional
/// remainders; ties keep input order. `target` is expected to be a whole number
/// within `[sum(floor), sum(floor) + len]`, anything outside is clamped to that
/// range.
pub fn largest_remainder_round(values: &[f64], target: f64) -> Vec<f64> {
    let mut rounded: Vec<f64> = values.iter().map(|v| v.floor()).collect();
    let floor_sum: f64 = rounded.iter().sum();

    let missing = (target - floor_sum).round().clamp(0.0, values.len() as f64) as usize;
    if missing == 0 {
        return rounded;
    }

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = values[a] - values[a].floor();
        let rb = values[b] - values[b].floor();
        rb.total_cmp(&ra)
    });

    for &idx in order.iter().take(missing) {
        rounded[idx] += 1.0;
    }

    rounded
}

pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
