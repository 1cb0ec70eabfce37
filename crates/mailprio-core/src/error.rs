use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("dataset file not found: {0}")]
    DatasetNotFound(std::path::PathBuf),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid label {label} at row {row}: expected 0 or 1")]
    InvalidLabel { row: usize, label: u8 },

    #[error("dataset has {0} rows, need at least 2 to split")]
    TooFewRows(usize),

    #[error("threshold {0} out of range [{min}, {max}]", min = crate::Threshold::MIN, max = crate::Threshold::MAX)]
    ThresholdOutOfRange(i64),

    #[error("invalid threshold {0:?}: expected a whole percentage")]
    InvalidThreshold(String),

    #[error("config error in {path}: {source}")]
    Config {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot read config {path}: {source}")]
    ReadConfig {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
