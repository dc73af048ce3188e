use crate::{CoreError, CoreResult};

/// Floating point type used throughout the engine
pub type Real = f64;

/// Passes `v` through, or names it in a [`CoreError::NonFinite`].
pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Checks that a breakpoint table has strictly increasing abscissae.
pub fn validate_table(table: &[(Real, Real)], what: &'static str) -> CoreResult<()> {
    if table.len() < 2 {
        return Err(CoreError::InvalidArg { what });
    }
    if table.windows(2).any(|w| w[1].0 <= w[0].0) {
        return Err(CoreError::UnorderedTable { what });
    }
    Ok(())
}

/// Piecewise-linear interpolation, held constant beyond either end.
///
/// `table` must be sorted by abscissa (see [`validate_table`]).
pub fn interpolate(table: &[(Real, Real)], x: Real) -> Real {
    let (first, last) = match (table.first(), table.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return 0.0,
    };
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }
    let idx = table.partition_point(|&(xi, _)| xi < x);
    let (x0, y0) = table[idx - 1];
    let (x1, y1) = table[idx];
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Enforces a numeric precondition.
///
/// Debug builds panic on a violation so the offending caller is found
/// immediately; release builds clamp into range and carry on.
#[inline]
#[track_caller]
pub fn precondition(value: Real, min: Real, max: Real, what: &'static str) -> Real {
    debug_assert!(
        value.is_finite() && value >= min && value <= max,
        "precondition violated for {what}: {value} not in [{min}, {max}]"
    );
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

/// Fraction of a step change a first-order lag covers in `dt`.
#[inline]
pub fn lag_fraction(dt: Real, tau: Real) -> Real {
    if tau <= 0.0 {
        1.0
    } else {
        1.0 - (-dt / tau).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn interpolate_holds_ends_and_blends_inside() {
        let table = [(0.0, 10.0), (10.0, 20.0), (20.0, 0.0)];
        assert_eq!(interpolate(&table, -5.0), 10.0);
        assert_eq!(interpolate(&table, 25.0), 0.0);
        assert!((interpolate(&table, 5.0) - 15.0).abs() < 1e-12);
        assert!((interpolate(&table, 15.0) - 10.0).abs() < 1e-12);
        assert_eq!(interpolate(&table, 10.0), 20.0);
    }

    #[test]
    fn table_validation() {
        assert!(validate_table(&[(0.0, 1.0), (1.0, 2.0)], "ok").is_ok());
        assert!(matches!(
            validate_table(&[(1.0, 1.0), (1.0, 2.0)], "dup"),
            Err(CoreError::UnorderedTable { .. })
        ));
        assert!(validate_table(&[(1.0, 1.0)], "short").is_err());
    }

    #[test]
    fn precondition_passes_in_range_values() {
        assert_eq!(precondition(5.0, 0.0, 10.0, "x"), 5.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "precondition violated")]
    fn precondition_fails_fast_in_debug() {
        precondition(-1.0, 0.0, 10.0, "mass");
    }

    #[test]
    fn lag_fraction_one_time_constant() {
        let f = lag_fraction(20.0, 20.0);
        assert!((f - (1.0 - (-1.0f64).exp())).abs() < 1e-12);
        assert_eq!(lag_fraction(1.0, 0.0), 1.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn interpolation_stays_within_breakpoint_range(x in -100.0f64..400.0) {
            let table = [(0.0, 3.0), (50.0, 1.0), (120.0, 8.0), (300.0, 2.0)];
            let y = interpolate(&table, x);
            prop_assert!((1.0..=8.0).contains(&y));
        }
    }
}
