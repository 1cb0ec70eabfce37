//! Training pipeline: read CSV, train, write artifacts.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use mailprio_ai::ArtifactPaths;
use tracing::info;

#[derive(Debug)]
pub struct TrainStats {
    pub rows: usize,
    pub test_accuracy: f64,
    pub elapsed_secs: f64,
}

/// Run the full training pipeline: load dataset → fit → evaluate → save.
pub fn run_training(data: &Path, paths: &ArtifactPaths) -> anyhow::Result<TrainStats> {
    let start = Instant::now();

    let records = mailprio_core::load_dataset(data)
        .with_context(|| format!("reading dataset {}", data.display()))?;
    info!(rows = records.len(), "training email priority model");

    let trained = mailprio_ai::train(&records).context("training model")?;
    paths.save(&trained).context("saving artifacts")?;

    Ok(TrainStats {
        rows: records.len(),
        test_accuracy: trained.report.test_accuracy,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailprio_core::Threshold;
    use std::fmt::Write as _;

    fn write_dataset(path: &Path) {
        let mut csv = String::from("subject,body,label\n");
        for i in 0..20 {
            writeln!(csv, "Urgent outage {i},server down respond now,1").unwrap();
            writeln!(csv, "Lunch {i},pizza friday kitchen,0").unwrap();
        }
        writeln!(csv, ",body without subject,0").unwrap();
        std::fs::write(path, csv).unwrap();
    }

    #[test]
    fn trains_and_writes_loadable_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("emails.csv");
        write_dataset(&data);
        let paths = ArtifactPaths::in_dir(&dir.path().join("models"));

        let stats = run_training(&data, &paths).unwrap();
        assert_eq!(stats.rows, 41);
        assert!((0.0..=1.0).contains(&stats.test_accuracy));

        let ctx = paths.load_context().unwrap();
        let outcome = ctx
            .classify("Urgent outage", "server down", Threshold::default())
            .unwrap();
        assert!(outcome.classification().is_some());
        assert!(paths.load_report().unwrap().is_some());
    }

    #[test]
    fn missing_dataset_fails_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let err = run_training(&dir.path().join("nope.csv"), &paths).unwrap_err();
        assert!(format!("{err:#}").contains("reading dataset"));
    }
}
