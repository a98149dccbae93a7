//! Output shapes for batches of embedding vectors.
//!
//! Formatting is pure: it never touches the cache or the network.

use crate::{Error, ErrorContext, Result};
use std::str::FromStr;

const FORMAT_NAMES: &str = "['df', 'df_c', 'df_r', 'array', 'list']";

/// Shape of the value returned by an embedding batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Table with one column per input text and one row per vector position.
    #[default]
    ColumnsPerText,
    /// Table with one row per input text and one column per vector position.
    RowsPerText,
    /// Dense array of shape `(inputs, dimensions)`.
    Array,
    /// The vectors as returned, in input order.
    List,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::ColumnsPerText => "df_c",
            OutputFormat::RowsPerText => "df_r",
            OutputFormat::Array => "array",
            OutputFormat::List => "list",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "df" | "df_c" => Ok(OutputFormat::ColumnsPerText),
            "df_r" => Ok(OutputFormat::RowsPerText),
            "array" => Ok(OutputFormat::Array),
            "list" => Ok(OutputFormat::List),
            other => Err(Error::invalid_argument_with_context(
                format!("Format must be one of {}, not '{}'", FORMAT_NAMES, other),
                ErrorContext::new()
                    .with_field_path("output_format")
                    .with_source("embeddings"),
            )),
        }
    }
}

/// Labelled 2-D table of embedding values, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingTable {
    index: Vec<String>,
    columns: Vec<String>,
    rows: Vec<Vec<f32>>,
}

impl EmbeddingTable {
    /// Row labels.
    pub fn index(&self) -> &[String] {
        &self.index
    }

    /// Column labels.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.index.len(), self.columns.len())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Values of the first row labelled `label`.
    pub fn row(&self, label: &str) -> Option<&[f32]> {
        let i = self.index.iter().position(|l| l == label)?;
        Some(&self.rows[i])
    }

    /// Values of the first column labelled `label`.
    pub fn column(&self, label: &str) -> Option<Vec<f32>> {
        let j = self.columns.iter().position(|l| l == label)?;
        Some(self.rows.iter().map(|r| r[j]).collect())
    }

    /// Pearson correlation between two columns. `None` if either label is
    /// missing or a column has zero variance.
    pub fn correlation(&self, a: &str, b: &str) -> Option<f64> {
        pearson(&self.column(a)?, &self.column(b)?)
    }
}

/// Dense row-major array of shape `(inputs, dimensions)`.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingArray {
    data: Vec<f32>,
    shape: (usize, usize),
}

impl EmbeddingArray {
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.shape.0 && col < self.shape.1 {
            Some(self.data[row * self.shape.1 + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> Option<&[f32]> {
        if row < self.shape.0 {
            let width = self.shape.1;
            Some(&self.data[row * width..(row + 1) * width])
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingOutput {
    Table(EmbeddingTable),
    Array(EmbeddingArray),
    List(Vec<Vec<f32>>),
}

impl EmbeddingOutput {
    pub fn as_table(&self) -> Option<&EmbeddingTable> {
        match self {
            EmbeddingOutput::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&EmbeddingArray> {
        match self {
            EmbeddingOutput::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Vec<f32>]> {
        match self {
            EmbeddingOutput::List(l) => Some(l),
            _ => None,
        }
    }
}

/// Arrange `vectors` (one per entry of `texts`, same order) into `format`.
pub fn format_embeddings<S: AsRef<str>>(
    texts: &[S],
    vectors: Vec<Vec<f32>>,
    format: OutputFormat,
) -> Result<EmbeddingOutput> {
    if texts.len() != vectors.len() {
        return Err(Error::invalid_argument(format!(
            "{} texts but {} embeddings",
            texts.len(),
            vectors.len()
        )));
    }
    if format == OutputFormat::List {
        return Ok(EmbeddingOutput::List(vectors));
    }

    let dims = common_dimensions(&vectors)?;
    let labels: Vec<String> = texts.iter().map(|t| t.as_ref().to_string()).collect();
    let positions: Vec<String> = (0..dims).map(|i| i.to_string()).collect();

    Ok(match format {
        OutputFormat::RowsPerText => EmbeddingOutput::Table(EmbeddingTable {
            index: labels,
            columns: positions,
            rows: vectors,
        }),
        OutputFormat::ColumnsPerText => {
            let rows: Vec<Vec<f32>> = (0..dims)
                .map(|i| vectors.iter().map(|v| v[i]).collect())
                .collect();
            EmbeddingOutput::Table(EmbeddingTable {
                index: positions,
                columns: labels,
                rows,
            })
        }
        OutputFormat::Array => EmbeddingOutput::Array(EmbeddingArray {
            shape: (vectors.len(), dims),
            data: vectors.into_iter().flatten().collect(),
        }),
        OutputFormat::List => unreachable!("handled above"),
    })
}

fn common_dimensions(vectors: &[Vec<f32>]) -> Result<usize> {
    let dims = vectors.first().map_or(0, Vec::len);
    if let Some(bad) = vectors.iter().position(|v| v.len() != dims) {
        return Err(Error::invalid_argument_with_context(
            "embeddings have inconsistent dimensionality",
            ErrorContext::new().with_details(format!(
                "item 0 has {} values, item {} has {}",
                dims,
                bad,
                vectors[bad].len()
            )),
        ));
    }
    Ok(dims)
}

fn pearson(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let n = a.len() as f64;
    let mean_a = a.iter().map(|&x| x as f64).sum::<f64>() / n;
    let mean_b = b.iter().map(|&x| x as f64).sum::<f64>() / n;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        let dx = x as f64 - mean_a;
        let dy = y as f64 - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<&'static str>, Vec<Vec<f32>>) {
        (
            vec!["apple", "banana", "cherry"],
            vec![
                vec![1.0, 2.0, 3.0, 4.0],
                vec![2.0, 4.0, 6.0, 8.0],
                vec![4.0, 3.0, 2.0, 1.0],
            ],
        )
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!("df".parse::<OutputFormat>().unwrap(), OutputFormat::ColumnsPerText);
        assert_eq!("df_c".parse::<OutputFormat>().unwrap(), OutputFormat::ColumnsPerText);
        assert_eq!("df_r".parse::<OutputFormat>().unwrap(), OutputFormat::RowsPerText);
        assert_eq!("array".parse::<OutputFormat>().unwrap(), OutputFormat::Array);
        assert_eq!("list".parse::<OutputFormat>().unwrap(), OutputFormat::List);
        let err = "bogus".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(err.to_string().contains("not 'bogus'"));
    }

    #[test]
    fn test_columns_per_text() {
        let (texts, vectors) = sample();
        let out = format_embeddings(&texts, vectors, OutputFormat::ColumnsPerText).unwrap();
        let table = out.as_table().unwrap();
        assert_eq!(table.shape(), (4, 3));
        assert_eq!(table.columns(), ["apple", "banana", "cherry"]);
        assert_eq!(table.column("banana").unwrap(), vec![2.0, 4.0, 6.0, 8.0]);
        assert_eq!(table.get(3, 2), Some(1.0));
    }

    #[test]
    fn test_rows_per_text() {
        let (texts, vectors) = sample();
        let out = format_embeddings(&texts, vectors, OutputFormat::RowsPerText).unwrap();
        let table = out.as_table().unwrap();
        assert_eq!(table.shape(), (3, 4));
        assert_eq!(table.index(), ["apple", "banana", "cherry"]);
        assert_eq!(table.row("cherry").unwrap(), &[4.0, 3.0, 2.0, 1.0]);
        assert_eq!(table.columns(), ["0", "1", "2", "3"]);
    }

    #[test]
    fn test_array_layout() {
        let (texts, vectors) = sample();
        let out = format_embeddings(&texts, vectors, OutputFormat::Array).unwrap();
        let array = out.as_array().unwrap();
        assert_eq!(array.shape(), (3, 4));
        assert_eq!(array.row(1).unwrap(), &[2.0, 4.0, 6.0, 8.0]);
        assert_eq!(array.get(2, 0), Some(4.0));
        assert_eq!(array.get(3, 0), None);
        assert_eq!(array.as_slice().len(), 12);
    }

    #[test]
    fn test_list_passthrough() {
        let (texts, vectors) = sample();
        let out = format_embeddings(&texts, vectors.clone(), OutputFormat::List).unwrap();
        assert_eq!(out.as_list().unwrap(), vectors.as_slice());
    }

    #[test]
    fn test_ragged_vectors_rejected_for_tables() {
        let texts = ["a", "b"];
        let vectors = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(format_embeddings(&texts, vectors.clone(), OutputFormat::Array).is_err());
        assert!(format_embeddings(&texts, vectors, OutputFormat::List).is_ok());
    }

    #[test]
    fn test_correlation() {
        let (texts, vectors) = sample();
        let out = format_embeddings(&texts, vectors, OutputFormat::ColumnsPerText).unwrap();
        let table = out.as_table().unwrap();
        let same = table.correlation("apple", "banana").unwrap();
        let opposite = table.correlation("apple", "cherry").unwrap();
        assert!((same - 1.0).abs() < 1e-9);
        assert!((opposite + 1.0).abs() < 1e-9);
        assert!(table.correlation("apple", "durian").is_none());
    }

    #[test]
    fn test_empty_batch() {
        let texts: [&str; 0] = [];
        let out = format_embeddings(&texts, Vec::new(), OutputFormat::Array).unwrap();
        assert_eq!(out.as_array().unwrap().shape(), (0, 0));
    }
}
