use anyhow::{Context, Result};
use flate2::read;
use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

const BUFFER_SIZE: usize = 128 * 1024;

/// Read normal or compressed files seamlessly.
/// Uses the presence of a `.gz` extension to decide, pass "-" for stdin.
/// # Example
/// ```
/// use std::io::BufRead;
/// let reader = otustats::myio::reader(".test/otu_table.tsv.gz").unwrap();
/// assert_eq!(reader.lines().count(), 7);
/// ```
pub fn reader(filename: &str) -> Result<Box<dyn BufRead + Send>> {
    if filename == "-" {
        return Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, io::stdin())));
    }
    let path = Path::new(filename);
    let file = File::open(path).with_context(|| format!("couldn't open {}", path.display()))?;

    if path.extension() == Some(OsStr::new("gz")) {
        Ok(Box::new(BufReader::with_capacity(
            BUFFER_SIZE,
            read::MultiGzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_gz_agree() {
        let plain: Vec<String> = reader(".test/otu_table.tsv")
            .unwrap()
            .lines()
            .map(|l| l.unwrap())
            .collect();
        let gz: Vec<String> = reader(".test/otu_table.tsv.gz")
            .unwrap()
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(plain, gz);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = reader(".test/does_not_exist.tsv").err().unwrap();
        assert!(err.to_string().contains("does_not_exist.tsv"));
    }
}
