//! Plotters-powered fit chart.
//!
//! Draws the observed samples as markers and the fitted curve as a line onto
//! any Plotters drawing area, so the same code serves a figure we own (bitmap
//! or SVG export) and a panel of a caller's multi-panel figure.
//!
//! Log axes are distinct coordinate types in Plotters, so the four
//! linear/log combinations are dispatched to one generic drawing routine.
//!
//! Text goes through Plotters' `ab_glyph` backend, which only knows fonts
//! registered at runtime; the embedded DejaVu Sans is registered as
//! `sans-serif` before the first chart is drawn.

use std::sync::OnceLock;

use plotters::coord::Shift;
use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::prelude::*;
use plotters::style::{FontStyle, register_font};

use crate::error::FitError;
use crate::plot::options::PlotStyle;

const DATA_COLOR: RGBColor = RGBColor(31, 119, 180);
const FIT_COLOR: RGBColor = RGBColor(255, 127, 14);

const FONT_FAMILY: &str = "sans-serif";
static DEJAVU_SANS: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Register the embedded font with Plotters (once per process).
pub fn ensure_fonts() -> Result<(), FitError> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED.get_or_init(|| {
        let ok = register_font(FONT_FAMILY, FontStyle::Normal, DEJAVU_SANS).is_ok();
        if ok {
            log::debug!("Registered embedded font as '{FONT_FAMILY}'");
        }
        ok
    });
    if ok {
        Ok(())
    } else {
        Err(FitError::Render("embedded font could not be parsed".into()))
    }
}

/// Draw samples and fitted curve onto `area`.
///
/// Points with a non-positive coordinate on a log axis cannot be placed and
/// are skipped.
pub fn draw_fit<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    data: &[(f64, f64)],
    curve: &[(f64, f64)],
    style: &PlotStyle,
) -> Result<(), FitError> {
    ensure_fonts()?;
    let (log_x, log_y) = (style.log_x(), style.log_y());
    let keep = |&(x, y): &(f64, f64)| (!log_x || x > 0.0) && (!log_y || y > 0.0);

    let n_in = data.len() + curve.len();
    let data: Vec<(f64, f64)> = data.iter().copied().filter(keep).collect();
    let curve: Vec<(f64, f64)> = curve.iter().copied().filter(keep).collect();
    let skipped = n_in - data.len() - curve.len();
    if skipped > 0 {
        log::warn!("Skipping {skipped} points with non-positive values on a log-scaled axis");
    }

    let (x0, x1) = axis_range(data.iter().chain(curve.iter()).map(|p| p.0), log_x);
    let (y0, y1) = axis_range(data.iter().chain(curve.iter()).map(|p| p.1), log_y);

    let drawn = match (log_x, log_y) {
        (false, false) => draw_on(area, x0..x1, y0..y1, &data, &curve, style),
        (true, false) => draw_on(area, (x0..x1).log_scale(), y0..y1, &data, &curve, style),
        (false, true) => draw_on(area, x0..x1, (y0..y1).log_scale(), &data, &curve, style),
        (true, true) => draw_on(
            area,
            (x0..x1).log_scale(),
            (y0..y1).log_scale(),
            &data,
            &curve,
            style,
        ),
    };
    drawn.map_err(|e| FitError::Render(e.to_string()))
}

fn draw_on<DB, X, Y>(
    area: &DrawingArea<DB, Shift>,
    x_spec: X,
    y_spec: Y,
    data: &[(f64, f64)],
    curve: &[(f64, f64)],
    style: &PlotStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
    X: AsRangedCoord<Value = f64>,
    Y: AsRangedCoord<Value = f64>,
    X::CoordDescType: ValueFormatter<f64>,
    Y::CoordDescType: ValueFormatter<f64>,
{
    let sci = |v: &f64| format!("{v:.1e}");
    area.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(area)
        .caption(style.title.as_str(), (FONT_FAMILY, 22).into_font())
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(64)
        .build_cartesian_2d(x_spec, y_spec)?;

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .x_labels(8)
        .y_labels(8);
    if style.sci_x() {
        mesh.x_label_formatter(&sci);
    }
    if style.sci_y() {
        mesh.y_label_formatter(&sci);
    }
    if !style.grid {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    let ms = style.marker_size;
    chart
        .draw_series(
            data.iter()
                .map(|&(x, y)| Circle::new((x, y), ms, DATA_COLOR.filled())),
        )?
        .label(style.data_label.as_str())
        .legend(move |(x, y)| Circle::new((x + 10, y), ms.max(2), DATA_COLOR.filled()));

    chart
        .draw_series(LineSeries::new(curve.iter().copied(), FIT_COLOR.stroke_width(2)))?
        .label(style.fit_label.as_str())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FIT_COLOR.stroke_width(2)));

    if style.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    Ok(())
}

/// Padded `[min, max]` of `values`.
///
/// Linear axes get 5% padding; log axes get 5% padding in log space. Empty
/// or degenerate inputs fall back to a unit-sized window.
pub fn axis_range(values: impl Iterator<Item = f64>, log: bool) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for v in values.filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }

    if log {
        if !(lo.is_finite() && hi.is_finite() && lo > 0.0) {
            return (0.1, 10.0);
        }
        let (l0, l1) = (lo.log10(), hi.log10());
        let pad = ((l1 - l0) * 0.05).max(0.05);
        return (10f64.powf(l0 - pad), 10f64.powf(l1 + pad));
    }

    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    let pad = if span > 0.0 {
        span * 0.05
    } else {
        lo.abs().max(1.0) * 0.5
    };
    (lo - pad, hi + pad)
}
