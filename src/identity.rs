use super::histogram::Histogram;
use super::otu::OtuTable;
use super::plot::HistogramPlot;
use anyhow::{bail, Result};
use plotters::style::{BLUE, RED};
use std::fmt;

/// Name of the percent identity column in an OTU table.
pub const IDENTITY_COLUMN: &str = "identity";
/// 10 x 6 inches at 300 dpi
pub const WIDTH: u32 = 3000;
pub const HEIGHT: u32 = 1800;
pub const DPI: u32 = 300;

/// Summary statistics of a numeric sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    /// sample standard deviation, NaN for a single value
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Quantile of sorted data, linear interpolation between the closest ranks.
/// # Example
/// ```
/// use otustats::identity::quantile;
/// assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.5), 2.5);
/// assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.25), 1.75);
/// ```
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// count, mean, std, min, quartiles and max of the values, `None` when empty.
pub fn describe(values: &[f64]) -> Option<Describe> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    } else {
        f64::NAN
    };

    Some(Describe {
        count: n,
        mean,
        std,
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[n - 1],
    })
}

fn two_dec(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else {
        format!("{:.2}", v)
    }
}

impl Describe {
    /// Legend entries for the mean and median markers.
    pub fn legend_labels(&self) -> [String; 2] {
        [
            format!("Moyenne: {}", two_dec(self.mean)),
            format!("Médiane: {}", two_dec(self.median)),
        ]
    }

    /// Dispersion lines shown in the box on the chart.
    pub fn stats_box(&self) -> Vec<String> {
        vec![
            format!("std : {}%", two_dec(self.std)),
            format!("variance : {}%", two_dec(self.std.powi(2))),
            format!("min : {}% | max : {}%", two_dec(self.min), two_dec(self.max)),
            format!("Q1 : {}% | Q3 : {}%", two_dec(self.q1), two_dec(self.q3)),
        ]
    }
}

impl fmt::Display for Describe {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let lines: Vec<String> = self
            .legend_labels()
            .into_iter()
            .chain(self.stats_box())
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Identity histogram layout: axis labels, mean (red) and median (blue)
/// markers in the legend, dispersion statistics in a box.
pub fn identity_plot(stats: &Describe) -> HistogramPlot {
    let [mean_label, median_label] = stats.legend_labels();
    HistogramPlot::new(WIDTH, HEIGHT, DPI)
        .alpha(0.7)
        .labels("Identity", "Number of OTUs")
        .marker(stats.mean, RED, Some(mean_label))
        .marker(stats.median, BLUE, Some(median_label))
        .text_box(stats.stats_box())
}

/// Read the identity column, print its statistics and plot its distribution.
/// # Example
/// ```
/// let dir = tempfile::tempdir().unwrap();
/// let out = dir.path().join("identity.png");
/// let stats = otustats::identity::identity_distribution(
///     ".test/otu_table.tsv",
///     out.to_str().unwrap(),
///     30,
/// )
/// .unwrap();
/// assert_eq!(stats.count, 5);
/// assert!(out.exists());
/// ```
pub fn identity_distribution(path: &str, save: &str, bins: usize) -> Result<Describe> {
    let table = OtuTable::from_file(path)?;
    let column = table.numeric_column(IDENTITY_COLUMN)?;
    let values = column.present();
    let dropped = column.values.len() - values.len();
    if dropped > 0 {
        log::warn!("{} rows without a numeric {}", dropped, IDENTITY_COLUMN);
    }

    let stats = match describe(&values) {
        Some(stats) => stats,
        None => bail!("no numeric values in column '{}' of {}", IDENTITY_COLUMN, path),
    };
    log::debug!("{:?}", stats);

    let hist = Histogram::new(&values, bins);
    identity_plot(&stats).save(&hist, save)?;
    Ok(stats)
}
