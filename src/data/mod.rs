//! Observation tables and synthetic data
//!
//! A [`Dataset`] is an immutable table of named `f64` columns of equal
//! length. It reads and writes CSV files with a header row, writing the
//! shortest representation that parses back to the same bits, so a saved
//! dataset loads back identical.
mod generate;

pub use generate::{
    uniform_covariate, Ar1Process, Generator, LinearProcess, Noise, SeasonalProcess, Synthetic,
    Truth,
};

use ndarray::Array1;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::dist::ParamError;

/// Error reading, writing, or generating a dataset
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The file does not exist. Callers usually fall back to a bundled
    /// copy, see [`Dataset::load_or`].
    #[error("no data file at {}", path.display())]
    NotFound { path: PathBuf },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    /// A field is not a number. `row` counts data rows from 1.
    #[error("could not parse '{value}' in column '{column}' at row {row}")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },
    /// Columns of different lengths
    #[error("column '{column}' has {len} values, expected {expected}")]
    RaggedColumns {
        column: String,
        len: usize,
        expected: usize,
    },
    #[error("no column named '{name}'")]
    MissingColumn { name: String },
    #[error("column '{name}' appears more than once")]
    DuplicateColumn { name: String },
    /// Invalid generator parameters
    #[error(transparent)]
    Param(#[from] ParamError),
}

/// An ordered table of named `f64` columns of equal length
///
/// # Example
///
/// ```
/// use genmodel::data::Dataset;
///
/// let data = Dataset::from_csv_str("x,y\n0,1.5\n1,2.5\n").unwrap();
/// assert_eq!(data.n_rows(), 2);
/// assert_eq!(data.column("y").unwrap(), &[1.5, 2.5]);
/// assert!(data.column("z").is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Dataset {
    /// Build a dataset from `(name, values)` pairs
    pub fn new<S: Into<String>>(columns: Vec<(S, Vec<f64>)>) -> Result<Self, DataError> {
        let mut data = Dataset::default();
        for (name, values) in columns {
            data.push_column(name.into(), values)?;
        }
        Ok(data)
    }

    fn push_column(&mut self, name: String, values: Vec<f64>) -> Result<(), DataError> {
        if self.names.contains(&name) {
            return Err(DataError::DuplicateColumn { name });
        }
        if let Some(first) = self.columns.first() {
            if first.len() != values.len() {
                return Err(DataError::RaggedColumns {
                    column: name,
                    len: values.len(),
                    expected: first.len(),
                });
            }
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    /// A copy with one more column
    pub fn with_column<S: Into<String>>(&self, name: S, values: Vec<f64>) -> Result<Self, DataError> {
        let mut data = self.clone();
        data.push_column(name.into(), values)?;
        Ok(data)
    }

    /// Read a CSV file with a header row
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => DataError::NotFound {
                path: path.to_owned(),
            },
            _ => DataError::Io(err),
        })?;
        let data = Self::from_reader(file)?;
        log::debug!(
            "loaded {} rows x {} columns from {}",
            data.n_rows(),
            data.n_cols(),
            path.display()
        );
        Ok(data)
    }

    /// Read `path`, or parse the `bundled` CSV text if the file does not
    /// exist. Any other failure is still an error.
    pub fn load_or<P: AsRef<Path>>(path: P, bundled: &str) -> Result<Self, DataError> {
        match Self::load(path) {
            Err(DataError::NotFound { path }) => {
                log::info!("{} not found, using the bundled copy", path.display());
                Self::from_csv_str(bundled)
            }
            res => res,
        }
    }

    pub fn from_csv_str(text: &str) -> Result<Self, DataError> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse CSV with a header row. Empty fields are read as `NaN`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let names: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
        let mut columns = vec![Vec::new(); names.len()];

        for (r, record) in reader.records().enumerate() {
            let record = record?;
            for ((field, column), name) in record.iter().zip(columns.iter_mut()).zip(&names) {
                let x = if field.is_empty() {
                    f64::NAN
                } else {
                    field.parse::<f64>().map_err(|_| DataError::Parse {
                        row: r + 1,
                        column: name.clone(),
                        value: field.to_owned(),
                    })?
                };
                column.push(x);
            }
        }
        Self::new(names.into_iter().zip(columns).collect())
    }

    /// Write CSV with a header row
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DataError> {
        let file = File::create(path.as_ref())?;
        self.to_writer(io::BufWriter::new(file))
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), DataError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.names)?;
        for row in 0..self.n_rows() {
            // Display is the shortest representation that round-trips
            writer.write_record(self.columns.iter().map(|c| c[row].to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, DataError> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        String::from_utf8(buf)
            .map_err(|err| DataError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn column(&self, name: &str) -> Result<&[f64], DataError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|ix| self.columns[ix].as_slice())
            .ok_or_else(|| DataError::MissingColumn {
                name: name.to_owned(),
            })
    }

    /// A column as an array, ready for [`Model::add_data`](crate::model::Model::add_data)
    pub fn array(&self, name: &str) -> Result<Array1<f64>, DataError> {
        self.column(name).map(|c| Array1::from(c.to_vec()))
    }

    /// Rows `0..n` and `n..`, e.g. to hold out the tail of a time series
    pub fn split_at(&self, n: usize) -> (Dataset, Dataset) {
        let n = n.min(self.n_rows());
        let (head, tail) = self
            .columns
            .iter()
            .map(|c| (c[..n].to_vec(), c[n..].to_vec()))
            .unzip();
        (
            Dataset {
                names: self.names.clone(),
                columns: head,
            },
            Dataset {
                names: self.names.clone(),
                columns: tail,
            },
        )
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset ({} rows)", self.n_rows())?;
        for (name, column) in self.names.iter().zip(&self.columns) {
            writeln!(f, "  {name}: {}", crate::misc::vec_to_string(column, 5))?;
        }
        Ok(())
    }
}
