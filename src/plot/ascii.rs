//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of a fit in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - target values: `o`
//! - fitted model: `-` line

use num_complex::Complex64;

use crate::models::hybridization;

/// Plot `Im Δ` of the target against the fitted bath over the first `points`
/// frequencies of `z`.
pub fn render_fit_plot(
    z: &[Complex64],
    target: &[Complex64],
    params: &[f64],
    points: usize,
    width: usize,
    height: usize,
) -> String {
    let n = points.min(z.len()).min(target.len());
    let omega: Vec<f64> = z[..n].iter().map(|zn| zn.im).collect();
    let observed: Vec<f64> = target[..n].iter().map(|t| t.im).collect();
    let fitted: Vec<f64> = z[..n].iter().map(|zn| hybridization(params, *zn).im).collect();
    render_series_plot(&omega, &observed, &fitted, width, height)
}

/// Plot `observed` as points and `fitted` as a line, both sampled at `x`.
pub fn render_series_plot(x: &[f64], observed: &[f64], fitted: &[f64], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = range(x).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(observed.iter().chain(fitted)).unwrap_or((-1.0, 0.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the fit first so target points overlay it.
    let curve: Vec<(f64, f64)> = x.iter().copied().zip(fitted.iter().copied()).collect();
    draw_curve(&mut grid, &curve, x_min, x_max, y_min, y_max);

    for (&xi, &yi) in x.iter().zip(observed) {
        let col = map_x(xi, x_min, x_max, width);
        let row = map_y(yi, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: omega=[{x_min:.3}, {x_max:.3}] | Im Delta=[{y_min:.3}, {y_max:.3}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn range<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
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
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
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
    use crate::math::matsubara_frequencies;
    use crate::models::semicircular_target;

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_series_plot(&[1.0, 10.0], &[-1.0, 0.0], &[-1.0, -1.0], 10, 5);
        let expected = concat!(
            "Plot: omega=[1.000, 10.000] | Im Delta=[-1.050, 0.050]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn fit_plot_has_requested_size() {
        let z = matsubara_frequencies(50, 10.0).unwrap();
        let target = semicircular_target(50, 10.0, 1.0).unwrap();
        let txt = render_fit_plot(&z, &target, &[0.0, 0.7], 20, 40, 12);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[1..].iter().all(|l| l.chars().count() == 40));
        assert!(txt.contains('o') && txt.contains('-'));
    }
}
