//! Harmonic basis terms for Fourier series.
//!
//! The `i`-th harmonic at frequency `w` is `cos(i·w·x)` / `sin(i·w·x)`.
//! For `i = 0` the cosine term is the constant `1` and the sine term vanishes,
//! which is what lets `a0` act as the intercept.

/// Phase of the `i`-th harmonic.
#[inline]
pub fn phase(i: usize, w: f64, x: f64) -> f64 {
    i as f64 * w * x
}

/// `cos(i·w·x)`.
#[inline]
pub fn cos_term(i: usize, w: f64, x: f64) -> f64 {
    phase(i, w, x).cos()
}

/// `sin(i·w·x)`.
#[inline]
pub fn sin_term(i: usize, w: f64, x: f64) -> f64 {
    phase(i, w, x).sin()
}

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
///
/// Returns `[min]` when `steps < 2`.
pub fn lin_space(min: f64, max: f64, steps: usize) -> Vec<f64> {
    if steps < 2 {
        return vec![min];
    }
    let step = (max - min) / (steps as f64 - 1.0);
    (0..steps).map(|i| min + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroth_harmonic_is_constant() {
        for &x in &[-3.0, 0.0, 0.5, 17.0] {
            assert_eq!(cos_term(0, 2.5, x), 1.0);
            assert_eq!(sin_term(0, 2.5, x), 0.0);
        }
    }

    #[test]
    fn lin_space_includes_endpoints() {
        let v = lin_space(0.5, 2.5, 5);
        assert_eq!(v.len(), 5);
        assert!((v[0] - 0.5).abs() < 1e-12);
        assert!((v[2] - 1.5).abs() < 1e-12);
        assert!((v[4] - 2.5).abs() < 1e-12);
    }
}
