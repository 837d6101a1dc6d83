//! Write a fit chart to an image file.
//!
//! The figure is rendered fully in memory and written with a single
//! `std::fs::write`, so a missing or read-only destination surfaces as a plain
//! I/O error carrying the path.
//!
//! - `.svg` -> Plotters' SVG backend (text is emitted as markup)
//! - anything else -> RGB bitmap encoded as PNG

use std::io::Cursor;
use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::error::FitError;
use crate::plot::chart::draw_fit;
use crate::plot::options::PlotOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Svg,
}

impl ImageKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => ImageKind::Svg,
            _ => ImageKind::Png,
        }
    }
}

/// Render the chart and write it to `opts.output_path()`.
pub fn save_figure(
    data: &[(f64, f64)],
    curve: &[(f64, f64)],
    opts: &PlotOptions,
) -> Result<PathBuf, FitError> {
    let path = opts.output_path();
    let size = opts.pixel_size();

    let bytes = match ImageKind::from_path(&path) {
        ImageKind::Svg => render_svg(data, curve, opts, size)?.into_bytes(),
        ImageKind::Png => render_png(data, curve, opts, size)?,
    };

    std::fs::write(&path, bytes).map_err(|e| FitError::io(&path, e))?;
    log::info!("Saved plot to '{}'", path.display());
    Ok(path)
}

fn render_svg(
    data: &[(f64, f64)],
    curve: &[(f64, f64)],
    opts: &PlotOptions,
    size: (u32, u32),
) -> Result<String, FitError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_fit(&root, data, curve, &opts.style)?;
        root.present()
            .map_err(|e| FitError::Render(e.to_string()))?;
    }
    Ok(svg)
}

fn render_png(
    data: &[(f64, f64)],
    curve: &[(f64, f64)],
    opts: &PlotOptions,
    size: (u32, u32),
) -> Result<Vec<u8>, FitError> {
    let (w, h) = size;
    let len = (w as usize)
        .checked_mul(h as usize)
        .and_then(|px| px.checked_mul(3))
        .ok_or_else(|| FitError::InvalidOption {
            option: "figure_size",
            value: format!("{w}x{h} px"),
        })?;
    let mut buf = vec![0u8; len];
    {
        let root = BitMapBackend::with_buffer(&mut buf, size).into_drawing_area();
        draw_fit(&root, data, curve, &opts.style)?;
        root.present()
            .map_err(|e| FitError::Render(e.to_string()))?;
    }

    let img = image::RgbImage::from_raw(w, h, buf)
        .ok_or_else(|| FitError::Render("bitmap buffer does not match figure size".into()))?;
    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageFormat::Png)
        .map_err(|e| FitError::Render(format!("PNG encoding failed: {e}")))?;
    Ok(png.into_inner())
}
