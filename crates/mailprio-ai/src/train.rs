//! Offline training: split, fit TF-IDF, train the network, evaluate.
//!
//! Hyperparameters are fixed constants.

use std::time::Instant;

use mailprio_core::{EmailRecord, train_test_split};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::network::{Gradients, Sequential};
use crate::optimizer::{Adam, AdamConfig};
use crate::tfidf::{MAX_FEATURES, TfidfVectorizer};
use crate::{AiError, encoder::FeatureVector};

pub const TEST_FRACTION: f64 = 0.2;
pub const VALIDATION_FRACTION: f64 = 0.1;
pub const SEED: u64 = 42;
pub const EPOCHS: usize = 5;
pub const BATCH_SIZE: usize = 16;

/// Clip probabilities away from 0 and 1 before taking logs.
const LOSS_EPSILON: f64 = 1e-7;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
    pub val_loss: Option<f64>,
    pub val_accuracy: Option<f64>,
}

/// Summary persisted next to the artifacts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingReport {
    /// ISO 8601 timestamp string.
    pub trained_at: String,
    pub train_rows: usize,
    pub validation_rows: usize,
    pub test_rows: usize,
    pub vocabulary_size: usize,
    pub epochs: Vec<EpochMetrics>,
    pub test_loss: f64,
    pub test_accuracy: f64,
}

/// A fitted vectorizer and trained network, ready to be saved.
pub struct TrainedModel {
    pub vectorizer: TfidfVectorizer,
    pub network: Sequential,
    pub report: TrainingReport,
}

/// Rows held out for validation out of `n` training rows.
///
/// The fit portion is floored, so validation rounds up; at least one row is
/// always left to fit on.
pub fn validation_rows(n: usize) -> usize {
    let fit = (n as f64 * (1.0 - VALIDATION_FRACTION)) as usize;
    (n - fit).min(n.saturating_sub(1))
}

/// Mean binary cross-entropy and accuracy at 0.5.
pub fn evaluate(network: &Sequential, features: &[FeatureVector], labels: &[f32]) -> Result<(f64, f64), AiError> {
    if features.is_empty() {
        return Ok((0.0, 0.0));
    }
    let mut loss = 0.0;
    let mut correct = 0usize;
    for (x, &y) in features.iter().zip(labels) {
        let p = network.predict(x)?;
        loss += bce(p, y);
        if (p > 0.5) == (y > 0.5) {
            correct += 1;
        }
    }
    let n = features.len() as f64;
    Ok((loss / n, correct as f64 / n))
}

fn bce(p: f32, y: f32) -> f64 {
    let p = f64::from(p).clamp(LOSS_EPSILON, 1.0 - LOSS_EPSILON);
    let y = f64::from(y);
    -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
}

fn labels_of(records: &[EmailRecord]) -> Vec<f32> {
    records.iter().map(|r| f32::from(r.label)).collect()
}

/// Run the full training pipeline on labelled records.
pub fn train(records: &[EmailRecord]) -> Result<TrainedModel, AiError> {
    train_with(records, EPOCHS, MAX_FEATURES)
}

pub(crate) fn train_with(
    records: &[EmailRecord],
    epochs: usize,
    max_features: usize,
) -> Result<TrainedModel, AiError> {
    let start = Instant::now();
    if records.len() < 2 {
        return Err(AiError::NotEnoughData {
            needed: 2,
            got: records.len(),
        });
    }

    let (train_set, test_set) = train_test_split(records, TEST_FRACTION, SEED)?;
    let train_text: Vec<String> = train_set.iter().map(EmailRecord::text).collect();
    let test_text: Vec<String> = test_set.iter().map(EmailRecord::text).collect();

    let vectorizer = TfidfVectorizer::fit(&train_text, max_features)?;
    let train_x = vectorizer.transform_batch(&train_text);
    let test_x = vectorizer.transform_batch(&test_text);
    let train_y = labels_of(&train_set);
    let test_y = labels_of(&test_set);
    info!(
        train = train_x.len(),
        test = test_x.len(),
        features = vectorizer.vocabulary_len(),
        "vectorized dataset"
    );

    // Validation rows come from the tail of the training split, unshuffled.
    let n_val = validation_rows(train_x.len());
    let n_fit = train_x.len() - n_val;
    let (fit_x, val_x) = train_x.split_at(n_fit);
    let (fit_y, val_y) = train_y.split_at(n_fit);

    let mut rng = StdRng::seed_from_u64(SEED);
    let mut network = Sequential::email_priority(vectorizer.vocabulary_len(), &mut rng);
    let mut adam = Adam::new(&network, AdamConfig::default());
    let mut grads = Gradients::zeros_like(&network);
    let mut order: Vec<usize> = (0..n_fit).collect();
    let mut history = Vec::with_capacity(epochs);

    for epoch in 1..=epochs {
        order.shuffle(&mut rng);
        let mut loss = 0.0;
        let mut correct = 0usize;

        for batch in order.chunks(BATCH_SIZE) {
            grads.reset();
            for &idx in batch {
                let p = network.accumulate_gradients(&fit_x[idx], fit_y[idx], &mut grads, &mut rng);
                loss += bce(p, fit_y[idx]);
                if (p > 0.5) == (fit_y[idx] > 0.5) {
                    correct += 1;
                }
            }
            adam.step(&mut network, &grads, batch.len());
        }

        let n = n_fit.max(1) as f64;
        let (val_loss, val_accuracy) = if val_x.is_empty() {
            (None, None)
        } else {
            let (l, a) = evaluate(&network, val_x, val_y)?;
            (Some(l), Some(a))
        };
        let metrics = EpochMetrics {
            epoch,
            loss: loss / n,
            accuracy: correct as f64 / n,
            val_loss,
            val_accuracy,
        };
        info!(
            epoch,
            epochs,
            loss = metrics.loss,
            accuracy = metrics.accuracy,
            val_loss = ?metrics.val_loss,
            val_accuracy = ?metrics.val_accuracy,
            "epoch complete"
        );
        history.push(metrics);
    }

    let (test_loss, test_accuracy) = evaluate(&network, &test_x, &test_y)?;
    info!(
        test_accuracy,
        elapsed_secs = start.elapsed().as_secs_f64(),
        "training complete"
    );

    let report = TrainingReport {
        trained_at: chrono::Utc::now().to_rfc3339(),
        train_rows: n_fit,
        validation_rows: n_val,
        test_rows: test_x.len(),
        vocabulary_size: vectorizer.vocabulary_len(),
        epochs: history,
        test_loss,
        test_accuracy,
    };

    Ok(TrainedModel {
        vectorizer,
        network,
        report,
    })
}
