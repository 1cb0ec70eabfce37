//! Labelled dataset loading and the seeded train/test split.

use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::{CoreError, EmailRecord};

/// Load `subject,body,label` rows from a CSV file with headers.
///
/// Rejects any label other than 0 or 1.
pub fn load_dataset(path: &Path) -> Result<Vec<EmailRecord>, CoreError> {
    if !path.exists() {
        return Err(CoreError::DatasetNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<EmailRecord>().enumerate() {
        let record = row?;
        if record.label > 1 {
            return Err(CoreError::InvalidLabel {
                row: i + 1,
                label: record.label,
            });
        }
        records.push(record);
    }

    let important = records.iter().filter(|r| r.is_important()).count();
    info!(
        rows = records.len(),
        important,
        path = %path.display(),
        "loaded dataset"
    );
    Ok(records)
}

/// Shuffle with a fixed seed and split off `ceil(test_fraction * n)` rows as
/// the test set. Both halves are guaranteed non-empty.
pub fn train_test_split(
    records: &[EmailRecord],
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<EmailRecord>, Vec<EmailRecord>), CoreError> {
    let n = records.len();
    if n < 2 {
        return Err(CoreError::TooFewRows(n));
    }

    let n_test = ((n as f64 * test_fraction).ceil() as usize).clamp(1, n - 1);

    let mut shuffled = records.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let test = shuffled.split_off(n - n_test);
    debug!(train = shuffled.len(), test = test.len(), seed, "split dataset");
    Ok((shuffled, test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rec(i: usize) -> EmailRecord {
        EmailRecord {
            subject: format!("subject {i}"),
            body: format!("body {i}"),
            label: (i % 2) as u8,
        }
    }

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_fills_missing_text_with_empty() {
        let file = write_csv("subject,body,label\nHello,,1\n,Body only,0\n");
        let records = load_dataset(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].body, "");
        assert_eq!(records[1].subject, "");
        assert_eq!(records[0].text(), "Hello ");
        assert_eq!(records[1].text(), " Body only");
    }

    #[test]
    fn load_rejects_bad_label() {
        let file = write_csv("subject,body,label\na,b,1\nc,d,2\n");
        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidLabel { row: 2, label: 2 }));
    }

    #[test]
    fn load_missing_file() {
        let err = load_dataset(Path::new("/nonexistent/emails.csv")).unwrap_err();
        assert!(matches!(err, CoreError::DatasetNotFound(_)));
    }

    #[test]
    fn split_sizes_use_ceiling() {
        let records: Vec<_> = (0..11).map(rec).collect();
        let (train, test) = train_test_split(&records, 0.2, 42).unwrap();
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
    }

    #[test]
    fn split_is_deterministic_per_seed() {
        let records: Vec<_> = (0..50).map(rec).collect();
        let a = train_test_split(&records, 0.2, 42).unwrap();
        let b = train_test_split(&records, 0.2, 42).unwrap();
        assert_eq!(a, b);

        let (mut all, test) = a;
        all.extend(test);
        all.sort_by(|x, y| x.subject.cmp(&y.subject));
        let mut expected = records.clone();
        expected.sort_by(|x, y| x.subject.cmp(&y.subject));
        assert_eq!(all, expected, "split must be a partition");
    }

    #[test]
    fn split_needs_two_rows() {
        assert!(matches!(
            train_test_split(&[rec(0)], 0.2, 42),
            Err(CoreError::TooFewRows(1))
        ));
    }

    #[test]
    fn split_keeps_both_sides_non_empty() {
        let records: Vec<_> = (0..2).map(rec).collect();
        let (train, test) = train_test_split(&records, 0.9, 7).unwrap();
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 1);
    }
}
