//! Least-squares objective for a Fourier series bound to samples.
//!
//! ```text
//! cost(θ) = ½ Σ (y_i - f(x_i; θ))²
//! ∇cost(θ) = -Σ r_i ∇f(x_i; θ)
//! ```
//!
//! The same struct is handed to argmin solvers (via `CostFunction` /
//! `Gradient` on `ndarray` vectors) and used directly by the grid and
//! quality code (via the slice-based helpers).

use argmin::core::{CostFunction, Error, Gradient};
use nalgebra::DMatrix;
use ndarray::Array1;

use crate::error::AppError;
use crate::models::FourierSeries;

/// Parameter vector type used with argmin.
pub type Theta = Array1<f64>;

#[derive(Debug, Clone, Copy)]
pub struct LeastSquares<'a> {
    model: &'a FourierSeries,
    x: &'a [f64],
    y: &'a [f64],
}

impl<'a> LeastSquares<'a> {
    /// # Panics
    /// Panics if `x` and `y` differ in length.
    pub fn new(model: &'a FourierSeries, x: &'a [f64], y: &'a [f64]) -> Self {
        assert_eq!(x.len(), y.len(), "x/y length mismatch");
        Self { model, x, y }
    }

    pub fn model(&self) -> &FourierSeries {
        self.model
    }

    pub fn x(&self) -> &[f64] {
        self.x
    }

    pub fn y(&self) -> &[f64] {
        self.y
    }

    pub fn n(&self) -> usize {
        self.x.len()
    }

    /// `y_i - f(x_i; θ)` for every sample.
    pub fn residuals(&self, theta: &[f64]) -> Vec<f64> {
        self.x
            .iter()
            .zip(self.y)
            .map(|(&x, &y)| y - self.model.eval(x, theta))
            .collect()
    }

    pub fn sse(&self, theta: &[f64]) -> f64 {
        self.residuals(theta).iter().map(|r| r * r).sum()
    }

    pub fn cost_at(&self, theta: &[f64]) -> f64 {
        0.5 * self.sse(theta)
    }

    pub fn gradient_at(&self, theta: &[f64]) -> Vec<f64> {
        let p = self.model.param_len();
        let mut grad = vec![0.0; p];
        let mut row = vec![0.0; p];
        for (&x, &y) in self.x.iter().zip(self.y) {
            let r = y - self.model.eval(x, theta);
            self.model.gradient(x, theta, &mut row);
            for (g, d) in grad.iter_mut().zip(&row) {
                *g -= r * d;
            }
        }
        grad
    }

    /// Jacobian of the model (rows = samples, columns = parameters).
    pub fn jacobian(&self, theta: &[f64]) -> DMatrix<f64> {
        let p = self.model.param_len();
        let mut jac = DMatrix::<f64>::zeros(self.n(), p);
        let mut row = vec![0.0; p];
        for (i, &x) in self.x.iter().enumerate() {
            self.model.gradient(x, theta, &mut row);
            for (j, &d) in row.iter().enumerate() {
                jac[(i, j)] = d;
            }
        }
        jac
    }
}

impl CostFunction for LeastSquares<'_> {
    type Param = Theta;
    type Output = f64;

    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let cost = self.cost_at(&theta.to_vec());
        if !cost.is_finite() {
            return Err(AppError::fit(format!("Non-finite least-squares cost ({cost}).")).into());
        }
        Ok(cost)
    }
}

impl Gradient for LeastSquares<'_> {
    type Param = Theta;
    type Gradient = Theta;

    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let grad = self.gradient_at(&theta.to_vec());
        if grad.iter().any(|g| !g.is_finite()) {
            return Err(AppError::fit("Non-finite least-squares gradient.").into());
        }
        Ok(Array1::from(grad))
    }
}
