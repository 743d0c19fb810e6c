use super::histogram::Histogram;
use anyhow::{anyhow, Context, Result};
use image::{ColorType, ImageFormat};
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::path::Path;
use std::sync::Once;

/// default bar color (#1f77b4)
pub const BAR_BLUE: RGBColor = RGBColor(31, 119, 180);
const FONT: &str = "sans-serif";
static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
static REGISTER_FONT: Once = Once::new();

/// Make the bundled font available to plotters under the "sans-serif" family.
fn register_fonts() -> Result<()> {
    let mut result = Ok(());
    REGISTER_FONT.call_once(|| {
        result = register_font(FONT, FontStyle::Normal, DEJAVU_SANS)
            .map_err(|_| anyhow!("bundled font could not be loaded"));
    });
    result
}

/// A dashed vertical line drawn over the bars, listed in the legend when labelled.
#[derive(Debug, Clone)]
pub struct Marker {
    pub value: f64,
    pub color: RGBColor,
    pub label: Option<String>,
}

/// Histogram chart: bars with black edges, axis labels, optional title,
/// dashed markers with a legend and a boxed block of text in the upper left.
#[derive(Debug, Clone)]
pub struct HistogramPlot {
    pub width: u32,
    pub height: u32,
    /// pixels per inch, font sizes are given in points
    pub dpi: u32,
    pub fill: RGBColor,
    pub alpha: f64,
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub markers: Vec<Marker>,
    pub text_box: Vec<String>,
}

impl HistogramPlot {
    pub fn new(width: u32, height: u32, dpi: u32) -> HistogramPlot {
        HistogramPlot {
            width: width.max(100),
            height: height.max(100),
            dpi: dpi.max(1),
            fill: BAR_BLUE,
            alpha: 1.0,
            title: None,
            x_label: String::new(),
            y_label: String::new(),
            markers: Vec::new(),
            text_box: Vec::new(),
        }
    }

    pub fn alpha(mut self, alpha: f64) -> HistogramPlot {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn title(mut self, title: &str) -> HistogramPlot {
        self.title = Some(title.to_string());
        self
    }

    pub fn labels(mut self, x_label: &str, y_label: &str) -> HistogramPlot {
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
        self
    }

    pub fn marker(mut self, value: f64, color: RGBColor, label: Option<String>) -> HistogramPlot {
        if value.is_finite() {
            self.markers.push(Marker {
                value,
                color,
                label,
            });
        } else {
            log::warn!("Not drawing a marker at non finite value {}", value);
        }
        self
    }

    pub fn text_box(mut self, lines: Vec<String>) -> HistogramPlot {
        self.text_box = lines;
        self
    }

    /// points to pixels
    fn px(&self, points: f64) -> f64 {
        points * self.dpi as f64 / 72.0
    }

    fn x_range(&self, hist: &Histogram) -> (f64, f64) {
        let mut lo = hist.lo();
        let mut hi = hist.hi();
        for m in &self.markers {
            lo = lo.min(m.value);
            hi = hi.max(m.value);
        }
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    }

    /// Draw the chart into an RGB buffer of `width * height * 3` bytes.
    pub fn render(&self, hist: &Histogram) -> Result<Vec<u8>> {
        register_fonts()?;
        let mut buf = vec![0_u8; self.width as usize * self.height as usize * 3];
        self.draw(hist, &mut buf)?;
        Ok(buf)
    }

    fn draw(&self, hist: &Histogram, buf: &mut [u8]) -> Result<()> {
        let root = BitMapBackend::with_buffer(buf, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_min, x_max) = self.x_range(hist);
        let y_max = hist.max_count().max(1) as f64 * 1.05;
        let line = self.px(1.0).round().max(1.0) as u32;
        let tick_font = (FONT, self.px(10.0)).into_font();
        let text_font = (FONT, self.px(12.0)).into_font();

        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(self.px(10.0) as u32)
            .x_label_area_size(self.px(36.0) as u32)
            .y_label_area_size(self.px(48.0) as u32);
        if let Some(title) = &self.title {
            builder.caption(title, text_font.clone());
        }
        let mut chart = builder.build_cartesian_2d(x_min..x_max, 0_f64..y_max)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .label_style(tick_font.clone())
            .axis_desc_style(tick_font.clone())
            .axis_style(BLACK.stroke_width(line))
            .draw()?;

        let bars: Vec<(f64, f64, f64)> = hist
            .counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(i, &count)| (hist.edges[i], hist.edges[i + 1], count as f64))
            .collect();
        let fill = self.fill.mix(self.alpha).filled();
        chart.draw_series(
            bars.iter()
                .map(|&(lo, hi, count)| Rectangle::new([(lo, 0.0), (hi, count)], fill)),
        )?;
        let edge = BLACK.stroke_width(line);
        chart.draw_series(
            bars.iter()
                .map(|&(lo, hi, count)| Rectangle::new([(lo, 0.0), (hi, count)], edge)),
        )?;

        let dash = y_max / 40.0;
        let gap = y_max / 80.0;
        for m in &self.markers {
            let style = m.color.stroke_width(2 * line);
            let x = m.value;
            let mut dashes = Vec::new();
            let mut y = 0.0;
            while y < y_max {
                dashes.push(vec![(x, y), (x, (y + dash).min(y_max))]);
                y += dash + gap;
            }
            let anno = chart.draw_series(dashes.into_iter().map(|d| PathElement::new(d, style)))?;
            if let Some(label) = &m.label {
                let key = self.px(20.0) as i32;
                anno.label(label.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + key, y)], style));
            }
        }
        if self.markers.iter().any(|m| m.label.is_some()) {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .label_font(tick_font.clone())
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        if !self.text_box.is_empty() {
            let (x_px, y_px) = chart.plotting_area().get_pixel_range();
            let width = (x_px.end - x_px.start) as f64;
            let height = (y_px.end - y_px.start) as f64;
            // top left corner at 2% / 15% of the axes, like a text placed in axes coordinates
            let left = x_px.start + (0.02 * width) as i32;
            let top = y_px.start + (0.15 * height) as i32;
            let style = TextStyle::from(text_font.clone()).color(&BLACK);
            let pad = self.px(4.0) as i32;

            let mut box_w = 0;
            let mut line_h = 0;
            for text in &self.text_box {
                let (w, h) = root.estimate_text_size(text, &style)?;
                box_w = box_w.max(w as i32);
                line_h = line_h.max(h as i32);
            }
            let line_h = (line_h as f64 * 1.2) as i32;
            let box_h = line_h * self.text_box.len() as i32;
            root.draw(&Rectangle::new(
                [(left, top), (left + box_w + 2 * pad, top + box_h + 2 * pad)],
                WHITE.mix(0.8).filled(),
            ))?;
            for (i, text) in self.text_box.iter().enumerate() {
                let pos = (left + pad, top + pad + i as i32 * line_h);
                root.draw(&Text::new(text.as_str(), pos, style.clone()))?;
            }
        }

        root.present()?;
        Ok(())
    }

    /// Render and write the chart as a PNG, whatever the extension of `path`.
    pub fn save<P: AsRef<Path>>(&self, hist: &Histogram, path: P) -> Result<()> {
        let path = path.as_ref();
        let buf = self.render(hist)?;
        image::save_buffer_with_format(
            path,
            &buf,
            self.width,
            self.height,
            ColorType::Rgb8,
            ImageFormat::Png,
        )
        .with_context(|| format!("couldn't write image {}", path.display()))?;
        log::info!(
            "Wrote {}x{} histogram to {}",
            self.width,
            self.height,
            path.display()
        );
        Ok(())
    }
}
