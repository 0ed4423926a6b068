//! Grid level generation.
//!
//! Pure functions mapping (bounds, count, spacing mode) to an ordered
//! sequence of price levels. Levels are computed once per run and never
//! change afterwards.

use grid_core::{Error, GridType, Result};

/// Generate `count` price levels between `lower` and `upper` inclusive.
///
/// The returned sequence is sorted ascending and its first/last elements
/// equal the bounds exactly. Fibonacci spacing is non-decreasing rather
/// than strictly increasing: the leading 0, 1, 1 of the ratio sequence
/// yields a duplicate interior level for small counts, which is preserved
/// deliberately.
pub fn generate_levels(lower: f64, upper: f64, count: u32, grid_type: GridType) -> Result<Vec<f64>> {
    if count < 2 {
        return Err(Error::config(format!(
            "grid needs at least 2 levels, got {count}"
        )));
    }
    if !lower.is_finite() || !upper.is_finite() || lower <= 0.0 {
        return Err(Error::config(format!(
            "grid bounds must be finite and positive, got [{lower}, {upper}]"
        )));
    }
    if lower >= upper {
        return Err(Error::config(format!(
            "lower bound {lower} must be below upper bound {upper}"
        )));
    }

    let levels = match grid_type {
        GridType::Linear => linear_levels(lower, upper, count),
        GridType::Geometric => geometric_levels(lower, upper, count),
        GridType::Fibonacci => fibonacci_levels(lower, upper, count),
    };
    Ok(levels)
}

fn linear_levels(lower: f64, upper: f64, count: u32) -> Vec<f64> {
    let step = (upper - lower) / (count - 1) as f64;
    (0..count)
        .map(|i| {
            if i == count - 1 {
                upper
            } else {
                lower + i as f64 * step
            }
        })
        .collect()
}

fn geometric_levels(lower: f64, upper: f64, count: u32) -> Vec<f64> {
    let log_step = (upper.ln() - lower.ln()) / (count - 1) as f64;
    (0..count)
        .map(|i| match i {
            0 => lower,
            i if i == count - 1 => upper,
            i => (lower.ln() + i as f64 * log_step).exp(),
        })
        .collect()
}

fn fibonacci_levels(lower: f64, upper: f64, count: u32) -> Vec<f64> {
    let ratios = fibonacci_ratios(count);
    let range = upper - lower;
    ratios
        .iter()
        .enumerate()
        .map(|(i, r)| {
            if i as u32 == count - 1 {
                upper
            } else {
                lower + r * range
            }
        })
        .collect()
}

/// First `n` Fibonacci numbers (0, 1, 1, 2, 3, 5, ...) normalized by the
/// largest. For `n = 2` this degenerates to {0, 1}, i.e. the two-point
/// linear grid on the bounds. Computed in f64 so large counts cannot
/// overflow.
fn fibonacci_ratios(n: u32) -> Vec<f64> {
    let mut fib = vec![0.0_f64, 1.0];
    for _ in 2..n {
        let next = fib[fib.len() - 1] + fib[fib.len() - 2];
        fib.push(next);
    }
    fib.truncate(n as usize);

    let max = fib[fib.len() - 1].max(1.0);
    fib.iter().map(|f| f / max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_linear_five_levels() {
        let levels = generate_levels(90.0, 110.0, 5, GridType::Linear).unwrap();
        let expected = [90.0, 95.0, 100.0, 105.0, 110.0];
        for (level, want) in levels.iter().zip(expected) {
            assert!((level - want).abs() < EPS);
        }
    }

    #[test]
    fn test_linear_constant_spacing_and_exact_bounds() {
        let levels = generate_levels(123.4, 567.8, 17, GridType::Linear).unwrap();
        assert_eq!(levels.len(), 17);
        assert_eq!(levels[0], 123.4);
        assert_eq!(levels[16], 567.8);

        let step = (567.8 - 123.4) / 16.0;
        for pair in levels.windows(2) {
            assert!((pair[1] - pair[0] - step).abs() < 1e-9);
        }
    }

    #[test]
    fn test_geometric_constant_log_spacing() {
        let levels = generate_levels(100.0, 1600.0, 5, GridType::Geometric).unwrap();
        assert_eq!(levels[0], 100.0);
        assert_eq!(levels[4], 1600.0);

        let log_step = (1600.0_f64 / 100.0).ln() / 4.0;
        for pair in levels.windows(2) {
            assert!(((pair[1] / pair[0]).ln() - log_step).abs() < 1e-9);
        }
        // Tighter spacing near the lower bound.
        assert!(levels[1] - levels[0] < levels[4] - levels[3]);
    }

    #[test]
    fn test_fibonacci_spacing_widens_toward_upper() {
        let levels = generate_levels(100.0, 200.0, 8, GridType::Fibonacci).unwrap();
        assert_eq!(levels[0], 100.0);
        assert_eq!(levels[7], 200.0);

        // Non-decreasing, with the last gap the widest.
        for pair in levels.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        let first_gap = levels[1] - levels[0];
        let last_gap = levels[7] - levels[6];
        assert!(last_gap > first_gap);
    }

    #[test]
    fn test_fibonacci_two_levels_is_two_point_linear() {
        let levels = generate_levels(90.0, 110.0, 2, GridType::Fibonacci).unwrap();
        assert_eq!(levels, vec![90.0, 110.0]);
    }

    #[test]
    fn test_fibonacci_keeps_duplicate_interior_level() {
        // fib = [0, 1, 1, 2] -> ratios [0, 0.5, 0.5, 1]
        let levels = generate_levels(100.0, 200.0, 4, GridType::Fibonacci).unwrap();
        assert!((levels[1] - 150.0).abs() < EPS);
        assert_eq!(levels[1], levels[2]);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(generate_levels(90.0, 110.0, 1, GridType::Linear).is_err());
        assert!(generate_levels(0.0, 110.0, 5, GridType::Linear).is_err());
        assert!(generate_levels(-5.0, 110.0, 5, GridType::Geometric).is_err());
        assert!(generate_levels(110.0, 90.0, 5, GridType::Linear).is_err());
        assert!(generate_levels(90.0, 90.0, 5, GridType::Fibonacci).is_err());
    }

    #[test]
    fn test_all_modes_sorted_ascending() {
        for grid_type in [GridType::Linear, GridType::Geometric, GridType::Fibonacci] {
            let levels = generate_levels(50.0, 150.0, 12, grid_type).unwrap();
            for pair in levels.windows(2) {
                assert!(pair[1] >= pair[0], "{grid_type:?} not sorted");
            }
        }
    }
}
