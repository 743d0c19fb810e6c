use super::histogram::Histogram;
use super::myio;
use super::plot::HistogramPlot;
use anyhow::{Context, Result};
use itertools::{Itertools, MinMaxResult};
use needletail::parse_fastx_reader;
use num_format::{Locale, ToFormattedString};
use std::io::BufRead;

/// 6.4 x 4.8 inches at 100 dpi
pub const WIDTH: u32 = 640;
pub const HEIGHT: u32 = 480;
pub const DPI: u32 = 100;

/// Lengths of every record in a fasta/fastq file, pass "-" for stdin.
/// Compressed input is detected automatically, an empty input has no records.
/// # Example
/// ```
/// use otustats::fastx;
/// assert_eq!(fastx::sequence_lengths(".test/seqs.fa").unwrap(), vec![10, 25, 3, 40]);
/// assert_eq!(fastx::sequence_lengths(".test/seqs.fa.gz").unwrap().len(), 4);
/// ```
pub fn sequence_lengths(infile: &str) -> Result<Vec<usize>> {
    let mut input = myio::reader(infile)?;
    let at_eof = input
        .fill_buf()
        .with_context(|| format!("couldn't read {}", infile))?
        .is_empty();
    if at_eof {
        log::warn!("{} is empty", infile);
        return Ok(Vec::new());
    }
    let mut reader = parse_fastx_reader(input)
        .with_context(|| format!("Missing or invalid fastx file {}", infile))?;
    let mut lengths = Vec::new();
    let mut rec_num = 0;
    while let Some(record) = reader.next() {
        let seq_rec =
            record.with_context(|| format!("Error reading record number {}", rec_num + 1))?;
        lengths.push(seq_rec.seq().len());
        rec_num += 1;
    }
    log::debug!("Read {} records from {}", rec_num, infile);
    Ok(lengths)
}

/// Plot a histogram of the sequence lengths of a fasta file.
/// # Example
/// ```
/// let dir = tempfile::tempdir().unwrap();
/// let out = dir.path().join("lengths.png");
/// let lengths = otustats::fastx::length_histogram(".test/seqs.fa", out.to_str().unwrap(), 50).unwrap();
/// assert_eq!(lengths.len(), 4);
/// assert!(out.exists());
/// ```
pub fn length_histogram(fasta: &str, output_image: &str, bins: usize) -> Result<Vec<usize>> {
    let lengths = sequence_lengths(fasta)?;
    match lengths.iter().minmax() {
        MinMaxResult::NoElements => log::warn!("No sequences in {}", fasta),
        MinMaxResult::OneElement(len) => log::info!("1 sequence of length {}", len),
        MinMaxResult::MinMax(min, max) => log::info!(
            "{} sequences, lengths {} to {}",
            lengths.len().to_formatted_string(&Locale::en),
            min.to_formatted_string(&Locale::en),
            max.to_formatted_string(&Locale::en)
        ),
    }

    let values: Vec<f64> = lengths.iter().map(|&l| l as f64).collect();
    let hist = Histogram::new(&values, bins);
    length_plot().save(&hist, output_image)?;
    Ok(lengths)
}

/// Title and axis labels of the length histogram.
pub fn length_plot() -> HistogramPlot {
    HistogramPlot::new(WIDTH, HEIGHT, DPI)
        .title("Histogram of Sequence Lengths")
        .labels("Sequence Length", "Frequency")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_multiline_records() {
        // seq2 spans two lines
        let lengths = sequence_lengths(".test/seqs.fa").unwrap();
        assert_eq!(lengths[1], 25);
        assert_eq!(lengths.iter().sum::<usize>(), 78);
    }

    #[test]
    fn test_missing_fasta() {
        let err = sequence_lengths(".test/nope.fa").unwrap_err();
        assert!(err.to_string().contains(".test/nope.fa"));
    }

    #[test]
    fn test_histogram_counts_every_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("len.png");
        let lengths = length_histogram(".test/seqs.fa.gz", out.to_str().unwrap(), 5).unwrap();
        let values: Vec<f64> = lengths.iter().map(|&l| l as f64).collect();
        assert_eq!(Histogram::new(&values, 5).total(), 4);
        assert!(out.exists());
    }

    #[test]
    fn test_chart_text() {
        let plot = length_plot();
        assert_eq!(plot.title.as_deref(), Some("Histogram of Sequence Lengths"));
        assert_eq!(plot.x_label, "Sequence Length");
        assert_eq!(plot.y_label, "Frequency");
        assert_eq!((plot.width, plot.height), (640, 480));
    }

    #[test]
    fn test_empty_fasta_draws_empty_chart() {
        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("empty.fa");
        fs::write(&fasta, "").unwrap();
        let out = dir.path().join("len.png");
        let lengths =
            length_histogram(fasta.to_str().unwrap(), out.to_str().unwrap(), 50).unwrap();
        assert!(lengths.is_empty());
        let bytes = fs::read(&out).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
