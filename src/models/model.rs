//! Fourier series model.
//!
//! Parameters live in a flat vector `θ` laid out as
//!
//! ```text
//! [a0, a1, …, an, b1, …, bn, w]
//! ```
//!
//! where the `b` block only exists for the full (sine+cosine) series. The
//! fitter relies on three primitive operations:
//! - build a design row of the linear coefficients for a fixed `w` (for OLS)
//! - evaluate `y(x)` given `θ` (for residuals/plots)
//! - the gradient `∂y/∂θ` (for BFGS and the covariance estimate)

use std::collections::BTreeMap;
use std::fmt;

use crate::domain::{ParamSet, SeriesKind};
use crate::error::AppError;
use crate::math::{cos_term, sin_term};

/// A Fourier series of fixed kind and order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FourierSeries {
    kind: SeriesKind,
    order: usize,
}

impl FourierSeries {
    pub fn new(kind: SeriesKind, order: usize) -> Self {
        Self { kind, order }
    }

    /// `a0 + Σ_{i=1..n} a_i·cos(i·w·x)`
    pub fn cosine(order: usize) -> Self {
        Self::new(SeriesKind::Cosine, order)
    }

    /// `a0 + Σ_{i=1..n} (a_i·cos(i·w·x) + b_i·sin(i·w·x))`
    pub fn full(order: usize) -> Self {
        Self::new(SeriesKind::Full, order)
    }

    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of linear coefficients (`a` and `b` terms).
    pub fn coef_len(&self) -> usize {
        match self.kind {
            SeriesKind::Cosine => self.order + 1,
            SeriesKind::Full => 2 * self.order + 1,
        }
    }

    /// Total parameter count (coefficients + frequency).
    pub fn param_len(&self) -> usize {
        self.coef_len() + 1
    }

    /// Index of `w` in `θ`.
    pub fn w_index(&self) -> usize {
        self.coef_len()
    }

    /// Parameter names in `θ` order.
    pub fn param_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.param_len());
        names.extend((0..=self.order).map(|i| format!("a{i}")));
        if self.kind == SeriesKind::Full {
            names.extend((1..=self.order).map(|i| format!("b{i}")));
        }
        names.push("w".to_string());
        names
    }

    /// Starting point: every coefficient at `coef`, frequency at `w`.
    pub fn initial_params(&self, coef: f64, w: f64) -> Vec<f64> {
        let mut theta = vec![coef; self.param_len()];
        theta[self.w_index()] = w;
        theta
    }

    /// Attach parameter names to a `θ` vector.
    ///
    /// # Panics
    /// Panics if `theta` does not have length `param_len()`.
    pub fn param_set(&self, theta: &[f64]) -> ParamSet {
        ParamSet::new(self.param_names(), theta.to_vec())
    }

    /// Rebuild `θ` from a name -> value map (e.g. a saved parameter file).
    ///
    /// The map must hold exactly this model's parameters.
    pub fn theta_from_map(&self, values: &BTreeMap<String, f64>) -> Result<Vec<f64>, AppError> {
        let names = self.param_names();
        if values.len() != names.len() {
            return Err(AppError::data(format!(
                "Expected {} parameters for a {} of order {}, found {}.",
                names.len(),
                self.kind.display_name(),
                self.order,
                values.len()
            )));
        }
        names
            .iter()
            .map(|name| {
                values
                    .get(name)
                    .copied()
                    .ok_or_else(|| AppError::data(format!("Missing parameter '{name}'.")))
            })
            .collect()
    }

    /// Infer kind and order from a set of parameter names.
    ///
    /// Accepts `a0..an` + `w`, optionally with `b1..bn`.
    pub fn from_param_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self, AppError> {
        let mut a_max: Option<usize> = None;
        let mut a_count = 0usize;
        let mut b_count = 0usize;
        let mut has_w = false;

        for name in names {
            if name == "w" {
                has_w = true;
                continue;
            }
            let unrecognized = || AppError::data(format!("Unrecognized parameter name '{name}'."));
            let mut chars = name.chars();
            let prefix = chars.next().ok_or_else(unrecognized)?;
            let idx: usize = chars.as_str().parse().map_err(|_| unrecognized())?;
            match prefix {
                'a' => {
                    a_count += 1;
                    a_max = Some(a_max.map_or(idx, |m| m.max(idx)));
                }
                'b' if idx >= 1 => b_count += 1,
                _ => return Err(unrecognized()),
            }
        }

        if !has_w {
            return Err(AppError::data("Parameter set has no frequency 'w'."));
        }
        let Some(order) = a_max else {
            return Err(AppError::data("Parameter set has no 'a' coefficients."));
        };
        if a_count != order + 1 {
            return Err(AppError::data(format!(
                "Coefficients a0..a{order} are not contiguous."
            )));
        }
        let kind = match b_count {
            0 => SeriesKind::Cosine,
            n if n == order => SeriesKind::Full,
            n => {
                return Err(AppError::data(format!(
                    "Found {n} sine coefficients for order {order}."
                )));
            }
        };
        Ok(Self::new(kind, order))
    }

    /// Fill the linear design row (all coefficients, no `w`) for a fixed `w`.
    ///
    /// # Panics
    /// Panics if `out` does not have length `coef_len()`.
    pub fn fill_design_row(&self, w: f64, x: f64, out: &mut [f64]) {
        let n = self.order;
        out[0] = 1.0;
        for i in 1..=n {
            out[i] = cos_term(i, w, x);
        }
        if self.kind == SeriesKind::Full {
            for i in 1..=n {
                out[n + i] = sin_term(i, w, x);
            }
        }
    }

    /// Evaluate `y(x)`.
    pub fn eval(&self, x: f64, theta: &[f64]) -> f64 {
        let n = self.order;
        let w = theta[self.w_index()];
        let mut y = theta[0];
        for i in 1..=n {
            y += theta[i] * cos_term(i, w, x);
        }
        if self.kind == SeriesKind::Full {
            for i in 1..=n {
                y += theta[n + i] * sin_term(i, w, x);
            }
        }
        y
    }

    /// Evaluate `y` at every `x`.
    pub fn eval_many(&self, xs: &[f64], theta: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x, theta)).collect()
    }

    /// Gradient `∂y/∂θ` at `x`.
    ///
    /// # Panics
    /// Panics if `out` does not have length `param_len()`.
    pub fn gradient(&self, x: f64, theta: &[f64], out: &mut [f64]) {
        let n = self.order;
        let wi = self.w_index();
        let w = theta[wi];

        out[0] = 1.0;
        let mut d_w = 0.0;
        for i in 1..=n {
            let (s, c) = crate::math::phase(i, w, x).sin_cos();
            out[i] = c;
            d_w -= theta[i] * i as f64 * x * s;
            if self.kind == SeriesKind::Full {
                out[n + i] = s;
                d_w += theta[n + i] * i as f64 * x * c;
            }
        }
        out[wi] = d_w;
    }
}

impl fmt::Display for FourierSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "y = a0")?;
        for i in 1..=self.order {
            let arg = if i == 1 { "w*x".to_string() } else { format!("{i}*w*x") };
            write!(f, " + a{i}*cos({arg})")?;
            if self.kind == SeriesKind::Full {
                write!(f, " + b{i}*sin({arg})")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_series_has_n_plus_one_coefficients_and_w() {
        for n in 0..6 {
            let model = FourierSeries::cosine(n);
            let names = model.param_names();
            assert_eq!(names.len(), n + 2);
            let coefs: Vec<_> = names.iter().filter(|s| s.starts_with('a')).collect();
            assert_eq!(coefs.len(), n + 1);
            assert_eq!(names.last().map(String::as_str), Some("w"));
        }
    }

    #[test]
    fn value_at_zero_is_sum_of_cosine_coefficients() {
        let model = FourierSeries::cosine(3);
        let theta = [0.5, 1.5, -2.0, 4.0, 0.7];
        let y0 = model.eval(0.0, &theta);
        assert!((y0 - (0.5 + 1.5 - 2.0 + 4.0)).abs() < 1e-12);
    }

    #[test]
    fn order_zero_is_constant() {
        let model = FourierSeries::cosine(0);
        let theta = [3.25, 9.0];
        for &x in &[-10.0, 0.0, 0.3, 1e6] {
            assert_eq!(model.eval(x, &theta), 3.25);
        }
        assert_eq!(model.to_string(), "y = a0");
    }

    #[test]
    fn names_are_deterministic() {
        let first = FourierSeries::cosine(12).param_names();
        let second = FourierSeries::cosine(12).param_names();
        assert_eq!(first, second);
        assert_eq!(&first[..3], &["a0", "a1", "a2"]);
        assert_eq!(first[10], "a10");
        assert_eq!(first[13], "w");
    }

    #[test]
    fn full_series_names_and_value() {
        let model = FourierSeries::full(2);
        assert_eq!(model.param_names(), vec!["a0", "a1", "a2", "b1", "b2", "w"]);

        let theta = [1.0, 2.0, 3.0, 4.0, 5.0, 0.5];
        let x: f64 = 1.2;
        let expected = 1.0
            + 2.0 * (0.5 * x).cos()
            + 3.0 * (2.0 * 0.5 * x).cos()
            + 4.0 * (0.5 * x).sin()
            + 5.0 * (2.0 * 0.5 * x).sin();
        assert!((model.eval(x, &theta) - expected).abs() < 1e-12);
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let h = 1e-6;
        for model in [FourierSeries::cosine(3), FourierSeries::full(2)] {
            let theta: Vec<f64> = (0..model.param_len()).map(|i| 0.3 + 0.2 * i as f64).collect();
            let x = 0.8;
            let mut grad = vec![0.0; model.param_len()];
            model.gradient(x, &theta, &mut grad);
            for k in 0..theta.len() {
                let mut up = theta.clone();
                let mut dn = theta.clone();
                up[k] += h;
                dn[k] -= h;
                let fd = (model.eval(x, &up) - model.eval(x, &dn)) / (2.0 * h);
                assert!((grad[k] - fd).abs() < 1e-6, "param {k}: {} vs {fd}", grad[k]);
            }
        }
    }

    #[test]
    fn display_renders_symbolic_model() {
        assert_eq!(
            FourierSeries::cosine(2).to_string(),
            "y = a0 + a1*cos(w*x) + a2*cos(2*w*x)"
        );
        assert_eq!(
            FourierSeries::full(1).to_string(),
            "y = a0 + a1*cos(w*x) + b1*sin(w*x)"
        );
    }

    #[test]
    fn design_row_reproduces_eval() {
        let model = FourierSeries::full(3);
        let theta: Vec<f64> = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 1.3];
        let mut row = vec![0.0; model.coef_len()];
        model.fill_design_row(1.3, 2.0, &mut row);
        let dot: f64 = row.iter().zip(&theta).map(|(r, t)| r * t).sum();
        assert!((dot - model.eval(2.0, &theta)).abs() < 1e-12);
    }

    #[test]
    fn infers_model_from_names() {
        let m = FourierSeries::from_param_names(["w", "a1", "a0", "a2"]).unwrap();
        assert_eq!(m, FourierSeries::cosine(2));

        let m = FourierSeries::from_param_names(["a0", "a1", "b1", "w"]).unwrap();
        assert_eq!(m, FourierSeries::full(1));

        assert!(FourierSeries::from_param_names(["a0", "a2", "w"]).is_err());
        assert!(FourierSeries::from_param_names(["a0", "a1"]).is_err());
        assert!(FourierSeries::from_param_names(["a0", "c1", "w"]).is_err());
    }

    #[test]
    fn theta_from_map_follows_model_order() {
        let model = FourierSeries::cosine(1);
        let mut map = BTreeMap::new();
        map.insert("w".to_string(), 2.0);
        map.insert("a1".to_string(), 0.5);
        map.insert("a0".to_string(), 1.0);
        assert_eq!(model.theta_from_map(&map).unwrap(), vec![1.0, 0.5, 2.0]);

        map.insert("a2".to_string(), 0.1);
        assert!(model.theta_from_map(&map).is_err());
    }
}
