use super::myio;
use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::io;

/// Cell values that count as missing, in text and numeric columns alike.
pub const NA_VALUES: [&str; 18] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan",
];

/// Is this cell one of the missing-value spellings?
pub fn is_missing(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

/// Coerce a raw cell to a number, anything unparsable becomes `None`.
/// # Example
/// ```
/// use otustats::otu::coerce_numeric;
/// assert_eq!(coerce_numeric("10"), Some(10.0));
/// assert_eq!(coerce_numeric(" 2.5e1 "), Some(25.0));
/// assert_eq!(coerce_numeric("NaN"), None);
/// assert_eq!(coerce_numeric("not_a_number"), None);
/// assert_eq!(coerce_numeric(""), None);
/// ```
pub fn coerce_numeric(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
}

/// A numeric column after coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericColumn {
    pub values: Vec<Option<f64>>,
    /// exact cell values, only when every cell is present and an integer literal
    pub integers: Option<Vec<i64>>,
}

impl NumericColumn {
    /// The non-missing values, in row order.
    pub fn present(&self) -> Vec<f64> {
        self.values.iter().flatten().copied().collect()
    }

    pub fn is_integral(&self) -> bool {
        self.integers.is_some()
    }
}

/// A tab separated table with a header row, held fully in memory.
#[derive(Debug)]
pub struct OtuTable {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl OtuTable {
    /// read in the table from a file, pass "-" for stdin
    /// # Example
    /// ```
    /// let table = otustats::otu::OtuTable::from_file(".test/otu_table.tsv").unwrap();
    /// assert_eq!(table.len(), 6);
    /// assert_eq!(table.headers()[1], "taxonomy");
    /// ```
    pub fn from_file(file_name: &str) -> Result<OtuTable> {
        let reader = myio::reader(file_name)?;
        OtuTable::from_reader(reader).with_context(|| format!("failed to read table {}", file_name))
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<OtuTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .context("reading header row")?
            .iter()
            .map(|h| h.to_string())
            .collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            bail!("no columns to parse, the header row is empty");
        }

        let mut rows = Vec::new();
        for (idx, rec) in reader.records().enumerate() {
            // +2 for the header and 1-based lines
            let line = idx + 2;
            let rec = rec.with_context(|| format!("error parsing table at line {}", line))?;
            // short rows are padded with missing cells, long ones have no column to go to
            if rec.len() > headers.len() {
                bail!(
                    "error parsing table at line {}: expected {} fields, saw {}",
                    line,
                    headers.len(),
                    rec.len()
                );
            }
            rows.push(rec);
        }
        log::debug!("Read {} rows with {} columns", rows.len(), headers.len());
        Ok(OtuTable { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        match self.headers.iter().position(|h| h == name) {
            Some(idx) => Ok(idx),
            None => bail!(
                "missing column '{}' (found: {})",
                name,
                self.headers.join(", ")
            ),
        }
    }

    fn cells(&self, name: &str) -> Result<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(idx).filter(|cell| !is_missing(cell)))
            .collect())
    }

    /// Text cells of a column, missing cells are `None`.
    /// # Example
    /// ```
    /// let table = otustats::otu::OtuTable::from_file(".test/otu_table.tsv").unwrap();
    /// let tax = table.text_column("taxonomy").unwrap();
    /// assert_eq!(tax[3], Some("unknown"));
    /// assert_eq!(tax[4], None);
    /// ```
    pub fn text_column(&self, name: &str) -> Result<Vec<Option<&str>>> {
        self.cells(name)
    }

    /// Numeric cells of a column, unparsable cells are `None`.
    /// # Example
    /// ```
    /// let table = otustats::otu::OtuTable::from_file(".test/otu_table.tsv").unwrap();
    /// let abundance = table.numeric_column("abundance").unwrap();
    /// assert_eq!(abundance.values[0], Some(10.0));
    /// assert_eq!(abundance.values[3], None);
    /// assert!(!abundance.is_integral());
    /// ```
    pub fn numeric_column(&self, name: &str) -> Result<NumericColumn> {
        let cells = self.cells(name)?;
        let integers = cells
            .iter()
            .map(|cell| cell.and_then(|c| c.trim().parse::<i64>().ok()))
            .collect::<Option<Vec<i64>>>();
        let values = cells
            .into_iter()
            .map(|cell| cell.and_then(coerce_numeric))
            .collect();
        Ok(NumericColumn { values, integers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_rows_are_missing() {
        let data = "taxonomy\tabundance\textra\nA|Bmycota\t3\tx\nC\n";
        let table = OtuTable::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.text_column("taxonomy").unwrap(), vec![Some("A|Bmycota"), Some("C")]);
        let abundance = table.numeric_column("abundance").unwrap();
        assert_eq!(abundance.values, vec![Some(3.0), None]);
        assert!(!abundance.is_integral());
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let data = "taxonomy\tabundance\nA\t3\nB\t4\tleftover\n";
        let err = OtuTable::from_reader(data.as_bytes()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("line 3"), "{}", msg);
        assert!(msg.contains("expected 2 fields, saw 3"), "{}", msg);
    }

    #[test]
    fn test_integral_column() {
        let data = "taxonomy\tabundance\nA\t3\nB\t9007199254740993\n";
        let table = OtuTable::from_reader(data.as_bytes()).unwrap();
        let abundance = table.numeric_column("abundance").unwrap();
        assert_eq!(abundance.integers, Some(vec![3, 9007199254740993]));
        assert_eq!(abundance.present().len(), 2);
    }

    #[test]
    fn test_missing_column() {
        let table = OtuTable::from_file(".test/otu_table.tsv").unwrap();
        let err = table.numeric_column("reads").unwrap_err();
        assert!(err.to_string().contains("missing column 'reads'"));
    }

    #[test]
    fn test_empty_input() {
        assert!(OtuTable::from_reader("".as_bytes()).is_err());
        let table = OtuTable::from_reader("taxonomy\tabundance\n".as_bytes()).unwrap();
        assert!(table.is_empty());
        assert!(table.numeric_column("abundance").unwrap().is_integral());
    }

    #[test]
    fn test_na_spellings() {
        for na in ["", "NA", "NaN", "nan", "N/A", "NULL", "<NA>"] {
            assert!(is_missing(na), "{:?} should be missing", na);
        }
        assert!(!is_missing("unknown"));
        assert!(!is_missing("0"));
    }
}
