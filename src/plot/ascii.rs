//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed samples: `o`
//! - fitted curve (evaluated at the sample `x` values): `-` line

use crate::domain::Residual;

/// Render data and fitted curve for a set of per-sample residuals.
pub fn render_ascii_plot(residuals: &[Residual], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(residuals).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(residuals).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut curve: Vec<(f64, f64)> = residuals.iter().map(|r| (r.x, r.y_fit)).collect();
    curve.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so samples can overlay).
    draw_curve(&mut grid, &curve, x_min, x_max, y_min, y_max);

    for r in residuals {
        let col = map_x(r.x, x_min, x_max, width);
        let row = map_y(r.y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}] | o=data -=fit\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn x_range(residuals: &[Residual]) -> Option<(f64, f64)> {
    let (min_x, max_x) = residuals
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| (lo.min(r.x), hi.max(r.x)));
    if min_x.is_finite() && max_x.is_finite() && max_x > min_x {
        Some((min_x, max_x))
    } else {
        None
    }
}

fn y_range(residuals: &[Residual]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for r in residuals {
        min_y = min_y.min(r.y).min(r.y_fit);
        max_y = max_y.max(r.y).max(r.y_fit);
    }
    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() && min_y == max_y {
        // Constant data: center it.
        Some((min_y - 0.5, max_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let Some(first_row) = grid.first() else {
        return;
    };
    let width = first_row.len();
    let height = grid.len();

    let mut prev = None;
    for &(x, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, '-'),
            None => grid[row][col] = '-',
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residual(x: f64, y: f64, y_fit: f64) -> Residual {
        Residual {
            x,
            y,
            y_fit,
            residual: y - y_fit,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let residuals = vec![
            residual(0.0, 0.0, 2.0),
            residual(4.5, 10.0, 8.0),
            residual(9.0, 0.0, 2.0),
        ];

        let txt = render_ascii_plot(&residuals, 10, 5);
        let expected = concat!(
            "Plot: x=[0.000, 9.000] | y=[-0.50, 10.50] | o=data -=fit\n",
            "     o    \n",
            "    --    \n",
            "  --  --  \n",
            "--      --\n",
            "o        o\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn unsorted_samples_draw_the_same_curve() {
        let sorted = vec![residual(0.0, 0.0, 2.0), residual(4.5, 10.0, 8.0), residual(9.0, 0.0, 2.0)];
        let shuffled = vec![sorted[2], sorted[0], sorted[1]];
        assert_eq!(render_ascii_plot(&sorted, 10, 5), render_ascii_plot(&shuffled, 10, 5));
    }

    #[test]
    fn constant_data_does_not_panic() {
        let residuals = vec![residual(0.0, 1.0, 1.0), residual(1.0, 1.0, 1.0)];
        let txt = render_ascii_plot(&residuals, 20, 6);
        assert_eq!(txt.lines().count(), 7);
        assert!(txt.contains('o'));
    }
}
