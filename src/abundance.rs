use super::otu::OtuTable;
use anyhow::Result;
use std::fmt;

/// Rank suffix shared by the fungal phyla (Ascomycota, Basidiomycota, ...).
pub const MYCOTA_SUFFIX: &str = "mycota";

/// One row of an OTU table as seen by the abundance calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceRecord {
    pub taxonomy: Option<String>,
    pub abundance: Option<f64>,
}

impl AbundanceRecord {
    pub fn new(taxonomy: Option<&str>, abundance: Option<f64>) -> AbundanceRecord {
        AbundanceRecord {
            taxonomy: taxonomy.map(|t| t.to_string()),
            abundance,
        }
    }
}

/// Does any `|` separated rank of the taxonomy end in `mycota`?
/// # Example
/// ```
/// use otustats::abundance::classify;
/// assert!(classify(Some("Foo|Basidiomycota|Bar")));
/// assert!(classify(Some("mycota")));
/// assert!(!classify(Some("Foo|Bar|Baz")));
/// assert!(!classify(Some("Mycotaceae")));
/// assert!(!classify(None));
/// ```
pub fn classify(taxonomy: Option<&str>) -> bool {
    match taxonomy {
        Some(tax) => tax.split('|').any(|rank| rank.ends_with(MYCOTA_SUFFIX)),
        None => false,
    }
}

/// Integer sums of an all-integer abundance column, free of float rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactSums {
    pub mycota: i128,
    pub total: i128,
}

/// Result of the abundance calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbundanceSummary {
    pub mycota: f64,
    pub total: f64,
    pub relative: f64,
    /// printed in place of the float sums when present
    pub exact: Option<ExactSums>,
}

/// Sum the abundance of the mycota records and of all records.
/// Missing abundances count as zero, an empty total gives a relative abundance of 0.
/// # Example
/// ```
/// use otustats::abundance::*;
/// let recs = vec![
///     AbundanceRecord::new(Some("Fungi|Ascomycota"), Some(10.0)),
///     AbundanceRecord::new(Some("Bacteria|Proteobacteria"), Some(30.0)),
/// ];
/// let summary = compute_abundance(&recs);
/// assert_eq!(summary.mycota, 10.0);
/// assert_eq!(summary.total, 40.0);
/// assert_eq!(summary.relative, 0.25);
/// ```
pub fn compute_abundance(records: &[AbundanceRecord]) -> AbundanceSummary {
    let mut mycota = 0.0;
    let mut total = 0.0;
    for rec in records {
        let value = rec.abundance.unwrap_or(0.0);
        if classify(rec.taxonomy.as_deref()) {
            mycota += value;
        }
        total += value;
    }
    let relative = if total > 0.0 { mycota / total } else { 0.0 };
    AbundanceSummary {
        mycota,
        total,
        relative,
        exact: None,
    }
}

/// Sum integer abundances exactly, `abundances[i]` belongs to `records[i]`.
/// # Example
/// ```
/// use otustats::abundance::*;
/// let recs = vec![
///     AbundanceRecord::new(Some("Amycota"), None),
///     AbundanceRecord::new(Some("B"), None),
/// ];
/// let sums = exact_sums(&recs, &[9007199254740993, 1]);
/// assert_eq!(sums.mycota, 9007199254740993);
/// assert_eq!(sums.total, 9007199254740994);
/// ```
pub fn exact_sums(records: &[AbundanceRecord], abundances: &[i64]) -> ExactSums {
    let mut sums = ExactSums {
        mycota: 0,
        total: 0,
    };
    for (rec, &value) in records.iter().zip(abundances) {
        if classify(rec.taxonomy.as_deref()) {
            sums.mycota += value as i128;
        }
        sums.total += value as i128;
    }
    sums
}

/// Pull the taxonomy and abundance columns out of a table.
/// Returns the records and, for an all-integer abundance column, the exact sums.
pub fn records_from_table(
    table: &OtuTable,
) -> Result<(Vec<AbundanceRecord>, Option<ExactSums>)> {
    let taxonomy = table.text_column("taxonomy")?;
    let abundance = table.numeric_column("abundance")?;
    let recs: Vec<AbundanceRecord> = taxonomy
        .into_iter()
        .zip(abundance.values)
        .map(|(tax, value)| AbundanceRecord::new(tax, value))
        .collect();
    let exact = abundance
        .integers
        .map(|integers| exact_sums(&recs, &integers));
    Ok((recs, exact))
}

/// Load an OTU table and compute the mycota abundance.
/// # Example
/// ```
/// let summary = otustats::abundance::abundance_from_file(".test/otu_table.tsv").unwrap();
/// assert_eq!(summary.mycota, 15.0);
/// assert_eq!(summary.total, 30.0);
/// assert_eq!(summary.relative, 0.5);
/// ```
pub fn abundance_from_file(path: &str) -> Result<AbundanceSummary> {
    let table = OtuTable::from_file(path)?;
    let (recs, exact) = records_from_table(&table)?;
    let n_mycota = recs
        .iter()
        .filter(|r| classify(r.taxonomy.as_deref()))
        .count();
    log::info!("{} of {} OTUs have a *{} rank", n_mycota, recs.len(), MYCOTA_SUFFIX);
    Ok(AbundanceSummary {
        exact,
        ..compute_abundance(&recs)
    })
}

/// Format a float the way a python `print` would: `15.0`, `0.5`, `1e-05`, `1e+16`.
/// # Example
/// ```
/// use otustats::abundance::py_float;
/// assert_eq!(py_float(15.0), "15.0");
/// assert_eq!(py_float(0.5), "0.5");
/// assert_eq!(py_float(0.00001), "1e-05");
/// assert_eq!(py_float(1e16), "1e+16");
/// ```
pub fn py_float(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "nan".to_string()
        } else if value > 0.0 {
            "inf".to_string()
        } else {
            "-inf".to_string()
        };
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let sci = format!("{:e}", value);
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let exp: i32 = exp.parse().unwrap_or(0);
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{}{:02}", mantissa, sign, exp.abs());
    }
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for AbundanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (mycota, total) = match self.exact {
            Some(sums) => (sums.mycota.to_string(), sums.total.to_string()),
            None => (py_float(self.mycota), py_float(self.total)),
        };
        writeln!(f, "Abondance totale des '{}' : {}", MYCOTA_SUFFIX, mycota)?;
        writeln!(f, "Abondance totale du jeu de données : {}", total)?;
        write!(
            f,
            "Abondance relative des '{}' : {:.4} ({:.2}%)",
            MYCOTA_SUFFIX,
            self.relative,
            self.relative * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recs(rows: &[(Option<&str>, &str)]) -> Vec<AbundanceRecord> {
        rows.iter()
            .map(|(tax, value)| AbundanceRecord::new(*tax, crate::otu::coerce_numeric(value)))
            .collect()
    }

    #[test]
    fn test_classify_is_exact_suffix() {
        assert!(classify(Some("Fungi|Ascomycota")));
        assert!(classify(Some("Chytridiomycota|")));
        assert!(!classify(Some("Fungi|Ascomycota ")));
        assert!(!classify(Some("Fungi|ASCOMYCOTA")));
        assert!(!classify(Some("")));
    }

    #[test]
    fn test_mixed_table() {
        let recs = recs(&[
            (Some("Fungi|Ascomycota"), "10"),
            (Some("Fungi|Basidiomycota"), "5"),
            (Some("Bacteria|Proteobacteria"), "15"),
            (Some("unknown"), "NaN"),
        ]);
        let summary = compute_abundance(&recs);
        assert_eq!(summary.mycota, 15.0);
        assert_eq!(summary.total, 30.0);
        assert_eq!(summary.relative, 0.5);
        assert_eq!(
            summary.to_string(),
            "Abondance totale des 'mycota' : 15.0\n\
             Abondance totale du jeu de données : 30.0\n\
             Abondance relative des 'mycota' : 0.5000 (50.00%)"
        );
    }

    #[test]
    fn test_all_missing_gives_zero() {
        let recs = recs(&[(Some("Ascomycota"), "not_a_number")]);
        let summary = compute_abundance(&recs);
        assert_eq!(summary.mycota, 0.0);
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.relative, 0.0);
        assert!(summary.to_string().ends_with(": 0.0000 (0.00%)"));
    }

    #[test]
    fn test_empty_table() {
        let summary = compute_abundance(&[]);
        assert_eq!(summary.relative, 0.0);
        assert!(!summary.relative.is_nan());
    }

    #[test]
    fn test_mycota_never_exceeds_total() {
        let recs = recs(&[
            (Some("Mucoromycota"), "3.5"),
            (None, "2"),
            (Some("Archaea|Euryarchaeota"), "0"),
            (Some("Zoopagomycota|x"), ""),
            (Some("Glomeromycota"), "1e3"),
        ]);
        let summary = compute_abundance(&recs);
        assert!(summary.mycota <= summary.total);
        assert_eq!(summary.mycota, 1003.5);
        assert_eq!(summary.total, 1005.5);
    }

    #[test]
    fn test_idempotent() {
        let recs = recs(&[(Some("Fungi|Ascomycota"), "7"), (Some("Plantae"), "3")]);
        assert_eq!(compute_abundance(&recs), compute_abundance(&recs));
    }

    #[test]
    fn test_integral_sums_print_as_integers() {
        let table = OtuTable::from_reader(
            "taxonomy\tabundance\nFungi|Ascomycota\t10\nBacteria\t30\n".as_bytes(),
        )
        .unwrap();
        let (recs, exact) = records_from_table(&table).unwrap();
        assert_eq!(exact, Some(ExactSums { mycota: 10, total: 40 }));
        let summary = AbundanceSummary {
            exact,
            ..compute_abundance(&recs)
        };
        let text = summary.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Abondance totale des 'mycota' : 10");
        assert_eq!(lines[1], "Abondance totale du jeu de données : 40");
        assert_eq!(lines[2], "Abondance relative des 'mycota' : 0.2500 (25.00%)");
    }

    #[test]
    fn test_from_file() {
        let summary = abundance_from_file(".test/otu_table.tsv.gz").unwrap();
        assert_eq!(summary.mycota, 15.0);
        assert_eq!(summary.total, 30.0);
        assert!(summary.exact.is_none());
    }

    #[test]
    fn test_integer_sums_beyond_float_precision() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("big.tsv");
        std::fs::write(&table, "taxonomy\tabundance\nAmycota\t9007199254740993\nB\t1\n")
            .unwrap();
        let summary = abundance_from_file(table.to_str().unwrap()).unwrap();
        let text = summary.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Abondance totale des 'mycota' : 9007199254740993");
        assert_eq!(lines[1], "Abondance totale du jeu de données : 9007199254740994");
    }

    #[test]
    fn test_py_float() {
        assert_eq!(py_float(0.0), "0.0");
        assert_eq!(py_float(-3.0), "-3.0");
        assert_eq!(py_float(1.25), "1.25");
        assert_eq!(py_float(1.5e-7), "1.5e-07");
        assert_eq!(py_float(f64::NAN), "nan");
    }
}
