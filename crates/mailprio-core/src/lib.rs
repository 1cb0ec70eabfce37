//! Core types shared by the mailprio training tool and front-end.

pub mod config;
pub mod dataset;
mod error;
pub mod record;
pub mod threshold;
pub mod verdict;

pub use config::Config;
pub use dataset::{load_dataset, train_test_split};
pub use error::CoreError;
pub use record::{EmailRecord, RawInput, combine_text};
pub use threshold::Threshold;
pub use verdict::{Classification, Confidence, Verdict};
