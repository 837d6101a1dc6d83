//! Plot configuration.
//!
//! `PlotStyle` holds the cosmetics shared by every drawing target;
//! `PlotOptions` adds what only matters when this crate owns the figure
//! (show/save flags, output file, resolution).
//!
//! Axis selectors arriving as strings are parsed here, so an unknown value is
//! rejected before anything is fitted or drawn.

use std::path::PathBuf;

use crate::domain::AxisSelection;
use crate::error::FitError;

/// Largest bitmap side, in pixels, a figure may have.
pub const MAX_PIXELS_PER_SIDE: u32 = 16_384;

#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Legend label of the observed samples.
    pub data_label: String,
    /// Legend label of the fitted curve.
    pub fit_label: String,
    /// Marker radius in pixels.
    pub marker_size: u32,
    /// Axes drawn on a logarithmic scale.
    pub log_scale: Option<AxisSelection>,
    /// Axes whose tick labels use scientific notation.
    pub scientific_notation: Option<AxisSelection>,
    pub grid: bool,
    pub legend: bool,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            title: "Title".to_string(),
            x_label: "X".to_string(),
            y_label: "Y".to_string(),
            data_label: "Data".to_string(),
            fit_label: "Fit".to_string(),
            marker_size: 3,
            log_scale: None,
            scientific_notation: None,
            grid: true,
            legend: true,
        }
    }
}

impl PlotStyle {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_marker_size(mut self, marker_size: u32) -> Self {
        self.marker_size = marker_size;
        self
    }

    /// Set the log-scale selector from its string form (`x`, `y`, `both`,
    /// `none` or `None`).
    pub fn with_log_scale(mut self, value: Option<&str>) -> Result<Self, FitError> {
        self.log_scale = AxisSelection::parse_option("log_scale", value)?;
        Ok(self)
    }

    /// Set the scientific-notation selector from its string form.
    pub fn with_scientific_notation(mut self, value: Option<&str>) -> Result<Self, FitError> {
        self.scientific_notation = AxisSelection::parse_option("scientific_notation", value)?;
        Ok(self)
    }

    pub fn log_x(&self) -> bool {
        self.log_scale.is_some_and(AxisSelection::includes_x)
    }

    pub fn log_y(&self) -> bool {
        self.log_scale.is_some_and(AxisSelection::includes_y)
    }

    pub fn sci_x(&self) -> bool {
        self.scientific_notation.is_some_and(AxisSelection::includes_x)
    }

    pub fn sci_y(&self) -> bool {
        self.scientific_notation.is_some_and(AxisSelection::includes_y)
    }
}

/// Options for a figure owned by this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    pub style: PlotStyle,
    /// Present the figure on the terminal.
    pub show: bool,
    /// Write the figure to an image file.
    pub save: bool,
    /// Output file; defaults to `<title>.png`. A `.svg` extension selects the
    /// SVG backend.
    pub file_name: Option<PathBuf>,
    pub dpi: u32,
    /// Figure size in inches.
    pub figure_size: (f64, f64),
    /// Terminal plot size in character cells.
    pub terminal_size: (usize, usize),
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            style: PlotStyle::default(),
            show: false,
            save: false,
            file_name: None,
            dpi: 200,
            figure_size: (6.4, 4.8),
            terminal_size: (80, 24),
        }
    }
}

impl PlotOptions {
    pub fn with_style(mut self, style: PlotStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    pub fn with_save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<PathBuf>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Whether any rendering was requested.
    pub fn is_rendering(&self) -> bool {
        self.show || self.save
    }

    /// Image path: the explicit file name, else `<title>.png`.
    ///
    /// The title is used verbatim; characters that are unsafe in file names
    /// are the caller's concern.
    pub fn output_path(&self) -> PathBuf {
        self.file_name
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.png", self.style.title)))
    }

    /// Bitmap size in pixels, `figure_size · dpi` (saturating at `u32::MAX`).
    pub fn pixel_size(&self) -> (u32, u32) {
        let (w, h) = self.figure_size;
        let dpi = self.dpi as f64;
        ((w * dpi).round() as u32, (h * dpi).round() as u32)
    }

    /// Reject option combinations that cannot produce a figure.
    pub fn validate(&self) -> Result<(), FitError> {
        let (w, h) = self.figure_size;
        if self.dpi == 0 || !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(FitError::InvalidOption {
                option: "figure_size",
                value: format!("{w}x{h} in @ {} dpi", self.dpi),
            });
        }
        let (pw, ph) = self.pixel_size();
        if pw < 16 || ph < 16 || pw > MAX_PIXELS_PER_SIDE || ph > MAX_PIXELS_PER_SIDE {
            return Err(FitError::InvalidOption {
                option: "figure_size",
                value: format!("{pw}x{ph} px"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_render_nothing() {
        let opts = PlotOptions::default();
        assert!(!opts.is_rendering());
        assert_eq!(opts.pixel_size(), (1280, 960));
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn output_path_comes_from_title_unless_named() {
        let opts = PlotOptions::default().with_style(PlotStyle::default().with_title("decay run"));
        assert_eq!(opts.output_path(), PathBuf::from("decay run.png"));

        let opts = opts.with_file_name("out/fig.svg");
        assert_eq!(opts.output_path(), PathBuf::from("out/fig.svg"));
    }

    #[test]
    fn string_selectors_are_validated() {
        let style = PlotStyle::default()
            .with_log_scale(Some("both"))
            .unwrap()
            .with_scientific_notation(Some("y"))
            .unwrap();
        assert!(style.log_x() && style.log_y());
        assert!(!style.sci_x() && style.sci_y());

        assert!(matches!(
            PlotStyle::default().with_log_scale(Some("z")),
            Err(FitError::InvalidOption { option: "log_scale", .. })
        ));
        assert!(matches!(
            PlotStyle::default().with_scientific_notation(Some("xy")),
            Err(FitError::InvalidOption { option: "scientific_notation", .. })
        ));
    }

    #[test]
    fn degenerate_figure_sizes_are_rejected() {
        let mut opts = PlotOptions::default();
        opts.dpi = 0;
        assert!(opts.validate().is_err());

        let mut opts = PlotOptions::default();
        opts.figure_size = (0.01, 4.8);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn oversized_figures_are_rejected() {
        let mut opts = PlotOptions::default();
        opts.dpi = u32::MAX;
        assert!(matches!(
            opts.validate(),
            Err(FitError::InvalidOption { option: "figure_size", .. })
        ));

        opts.dpi = 1_000_000;
        assert!(opts.validate().is_err());

        // 6.4 in * 2560 dpi = 16384 px: exactly at the cap.
        opts.dpi = 2560;
        opts.figure_size = (6.4, 4.8);
        assert_eq!(opts.pixel_size().0, MAX_PIXELS_PER_SIDE);
        assert!(opts.validate().is_ok());
    }
}
