use itertools::{Itertools, MinMaxResult};

/// Equal width binning of a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges, increasing
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bin the finite values into `bins` equal width bins between the min and max.
    /// Each bin is half open except the last one, which also holds the max.
    /// # Example
    /// ```
    /// let hist = otustats::histogram::Histogram::new(&[1.0, 2.0, 2.0, 3.0, 4.0], 3);
    /// assert_eq!(hist.counts, vec![1, 2, 2]);
    /// assert_eq!(hist.edges[0], 1.0);
    /// assert_eq!(hist.edges[3], 4.0);
    /// ```
    pub fn new(values: &[f64], bins: usize) -> Histogram {
        let bins = bins.max(1);
        let (lo, hi) = match values.iter().filter(|v| v.is_finite()).minmax() {
            MinMaxResult::NoElements => (0.0, 1.0),
            MinMaxResult::OneElement(v) => (v - 0.5, v + 0.5),
            MinMaxResult::MinMax(min, max) if min == max => (min - 0.5, max + 0.5),
            MinMaxResult::MinMax(min, max) => (*min, *max),
        };
        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0_u64; bins];
        for v in values.iter().filter(|v| v.is_finite()) {
            let mut idx = ((v - lo) / width) as usize;
            // floating point error can push a value across an edge
            if idx >= bins {
                idx = bins - 1;
            } else if *v < edges[idx] && idx > 0 {
                idx -= 1;
            } else if idx + 1 < bins && *v >= edges[idx + 1] {
                idx += 1;
            }
            counts[idx] += 1;
        }
        log::trace!("histogram edges: {:?}", edges);
        Histogram { edges, counts }
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    pub fn lo(&self) -> f64 {
        self.edges[0]
    }

    pub fn hi(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }
}
