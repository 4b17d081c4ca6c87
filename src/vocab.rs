//! Category vocabularies built from the reference dataset.
//!
//! At startup the reference dataset is scanned once and each categorical
//! column is factorized: every distinct text value receives an integer
//! code in order of first appearance (first value seen gets 0, second
//! distinct value gets 1, and so on). The resulting vocabularies are
//! immutable for the process lifetime and shared read-only by all
//! requests.
//!
//! A column missing from the reference dataset is not an error: a
//! column-specific default value is injected for every row before
//! factorization, yielding a single-entry vocabulary mapping that
//! default to code 0.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{PanenError, Result};

/// Categorical columns encoded before inference, in schema order.
pub const CATEGORICAL_COLS: [&str; 4] = [
    "penanggung_jawab",
    "jenis_tanah",
    "sistem_irigasi",
    "lahan_kabupaten",
];

/// Default value injected when a categorical column is absent from the
/// reference dataset.
#[must_use]
pub fn default_category(column: &str) -> &'static str {
    match column {
        "penanggung_jawab" => "Tim A",
        "jenis_tanah" => "Alluvial",
        "sistem_irigasi" => "Tanpa Irigasi",
        _ => "Unknown",
    }
}

/// Mapping from category text to integer code for one column.
///
/// Codes are assigned in first-seen order over the reference dataset,
/// so repeated builds over the same dataset produce identical
/// vocabularies.
#[derive(Debug, Clone)]
pub struct CategoryVocabulary {
    column: String,
    codes: HashMap<String, u32>,
}

impl CategoryVocabulary {
    /// Factorize `values`: distinct entries get codes in first-seen order.
    pub fn from_values<'a, I>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut codes = HashMap::new();
        let mut next = 0u32;
        for value in values {
            if !codes.contains_key(value) {
                codes.insert(value.to_string(), next);
                next += 1;
            }
        }
        Self {
            column: column.to_string(),
            codes,
        }
    }

    /// Column this vocabulary encodes.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Code for a known category, `None` if the value was never seen.
    #[must_use]
    pub fn code(&self, value: &str) -> Option<u32> {
        self.codes.get(value).copied()
    }

    /// Code for a category, substituting 0 for unseen values.
    ///
    /// Unseen categories degrade to code 0 rather than erroring; this is
    /// the serving contract, not a fallback of convenience.
    #[must_use]
    pub fn code_or_default(&self, value: &str) -> u32 {
        self.code(value).unwrap_or(0)
    }

    /// Number of distinct categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the vocabulary holds no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

/// Reference dataset used only to discover the known categories per
/// column. Stored column-major; values are kept as raw text since only
/// the categorical columns are ever read.
#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    columns: HashMap<String, Vec<String>>,
    n_rows: usize,
}

impl ReferenceDataset {
    /// Build a dataset from named columns. Used by tests and demo setups;
    /// production loads go through [`ReferenceDataset::from_csv_path`].
    #[must_use]
    pub fn from_columns(columns: Vec<(String, Vec<String>)>) -> Self {
        let n_rows = columns.first().map_or(0, |(_, values)| values.len());
        Self {
            columns: columns.into_iter().collect(),
            n_rows,
        }
    }

    /// Read a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns [`PanenError::StartupLoad`] if the file cannot be opened
    /// or any record fails to parse.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| PanenError::StartupLoad {
            reason: format!(
                "reference dataset '{}' could not be opened: {e}",
                path.display()
            ),
        })?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| PanenError::StartupLoad {
                reason: format!("reference dataset has no parseable header row: {e}"),
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let mut columns: HashMap<String, Vec<String>> = headers
            .iter()
            .map(|h| (h.clone(), Vec::new()))
            .collect();
        let mut n_rows = 0usize;

        for record in reader.records() {
            let record = record.map_err(|e| PanenError::StartupLoad {
                reason: format!("reference dataset row {} is malformed: {e}", n_rows + 1),
            })?;
            for (header, field) in headers.iter().zip(record.iter()) {
                if let Some(column) = columns.get_mut(header) {
                    column.push(field.to_string());
                }
            }
            n_rows += 1;
        }

        Ok(Self { columns, n_rows })
    }

    /// Values of a column, row order preserved.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Number of data rows (excluding the header).
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }
}

/// Build one vocabulary per requested categorical column.
///
/// Columns present in the dataset are factorized in row order; missing
/// columns get the documented default value injected for every row
/// first, which factorizes to a single-entry vocabulary.
#[must_use]
pub fn build_vocabularies(
    dataset: &ReferenceDataset,
    categorical: &[&str],
) -> HashMap<String, CategoryVocabulary> {
    let mut vocabularies = HashMap::new();
    for &column in categorical {
        let vocabulary = match dataset.column(column) {
            Some(values) => {
                CategoryVocabulary::from_values(column, values.iter().map(String::as_str))
            }
            None => {
                let default = default_category(column);
                let injected = vec![default; dataset.n_rows().max(1)];
                CategoryVocabulary::from_values(column, injected)
            }
        };
        vocabularies.insert(column.to_string(), vocabulary);
    }
    vocabularies
}
