//! ASCII plotting for terminal output.
//!
//! This is the "show" path: a fixed-size character grid, optimized for
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed samples: `o`
//! - fitted curve: `-` line
//!
//! Log-scaled axes are plotted in `log10` space; non-positive values on such
//! an axis are dropped.

use crate::plot::options::PlotStyle;

/// Render samples and fitted curve into a string.
pub fn render_ascii_plot(
    data: &[(f64, f64)],
    curve: &[(f64, f64)],
    style: &PlotStyle,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let (log_x, log_y) = (style.log_x(), style.log_y());

    let project = |&(x, y): &(f64, f64)| -> Option<(f64, f64)> {
        let px = if log_x { (x > 0.0).then(|| x.log10())? } else { x };
        let py = if log_y { (y > 0.0).then(|| y.log10())? } else { y };
        (px.is_finite() && py.is_finite()).then_some((px, py))
    };
    let data: Vec<(f64, f64)> = data.iter().filter_map(project).collect();
    let curve: Vec<(f64, f64)> = curve.iter().filter_map(project).collect();

    let (x_min, x_max) = range(data.iter().chain(curve.iter()).map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(data.iter().chain(curve.iter()).map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    draw_curve(&mut grid, &curve, x_min, x_max, y_min, y_max);

    for &(x, y) in &data {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!("{}\n", style.title));
    out.push_str(&format!(
        "{}=[{}, {}] | {}=[{}, {}]\n",
        axis_name(&style.x_label, log_x),
        fmt_tick(x_min, style.sci_x()),
        fmt_tick(x_max, style.sci_x()),
        axis_name(&style.y_label, log_y),
        fmt_tick(y_min, style.sci_y()),
        fmt_tick(y_max, style.sci_y()),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    if style.legend {
        out.push_str(&format!("o {}   - {}\n", style.data_label, style.fit_label));
    }

    out
}

fn axis_name(label: &str, log: bool) -> String {
    if log {
        format!("log10({label})")
    } else {
        label.to_string()
    }
}

fn fmt_tick(v: f64, sci: bool) -> String {
    if sci { format!("{v:.2e}") } else { format!("{v:.3}") }
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else if min.is_finite() && max.is_finite() {
        Some((min - 0.5, max + 0.5))
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

/// Integer line drawing (Bresenham-ish).
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
    use crate::domain::AxisSelection;

    #[test]
    fn plot_golden_snapshot_small() {
        let data = vec![(1.0, 100.0), (10.0, 110.0)];
        let curve = vec![(1.0, 100.0), (10.0, 100.0)];
        let style = PlotStyle::default().with_title("Golden");

        let txt = render_ascii_plot(&data, &curve, &style, 10, 5);
        let expected = concat!(
            "Golden\n",
            "X=[1.000, 10.000] | Y=[99.500, 110.500]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
            "o Data   - Fit\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn log_axis_drops_non_positive_points_and_renames_axis() {
        let data = vec![(-1.0, 1.0), (1.0, 10.0), (100.0, 1000.0)];
        let mut style = PlotStyle::default();
        style.log_scale = Some(AxisSelection::Both);
        style.legend = false;

        let txt = render_ascii_plot(&data, &[], &style, 20, 6);
        assert!(txt.contains("log10(X)=[0.000, 2.000]"));
        let markers: usize = txt.lines().skip(2).map(|l| l.matches('o').count()).sum();
        assert_eq!(markers, 2);
        assert!(!txt.contains("Data"));
    }

    #[test]
    fn scientific_ticks_in_header() {
        let data = vec![(0.0, 1.0e6), (1.0, 2.0e6)];
        let mut style = PlotStyle::default();
        style.scientific_notation = Some(AxisSelection::Y);

        let txt = render_ascii_plot(&data, &[], &style, 20, 6);
        assert!(txt.contains("Y=[9.50e5, 2.05e6]"));
        assert!(txt.contains("X=[0.000, 1.000]"));
    }
}
