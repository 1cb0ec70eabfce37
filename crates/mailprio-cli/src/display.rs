//! Terminal rendering for classification results and training reports.

use std::io::{self, Write};

use mailprio_ai::{Outcome, TrainingReport};
use mailprio_core::{Classification, Verdict};
use serde::Serialize;

use crate::interactive::NEEDS_INPUT_WARNING;

const BAR_WIDTH: usize = 40;
const FILL: char = '█';
const EMPTY: char = '░';

/// A fixed-width bar filled in proportion to `percent` (0–100).
pub fn bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    let mut s = String::with_capacity(BAR_WIDTH * 3);
    s.extend(std::iter::repeat_n(FILL, filled));
    s.extend(std::iter::repeat_n(EMPTY, BAR_WIDTH - filled));
    s
}

/// Print both confidence bars followed by the verdict line.
pub fn write_classification(out: &mut impl Write, result: &Classification) -> io::Result<()> {
    let c = &result.confidence;
    writeln!(out, "Prediction Result")?;
    writeln!(out, "  {:<15} {} {:>6.2}%", "Important", bar(c.important), c.important)?;
    writeln!(
        out,
        "  {:<15} {} {:>6.2}%",
        "Not Important",
        bar(c.not_important),
        c.not_important
    )?;
    writeln!(out)?;
    let mark = match result.verdict {
        Verdict::Important => "[+]",
        Verdict::NotImportant => "[-]",
    };
    writeln!(out, "{mark} {result}  (threshold {})", result.threshold)
}

/// JSON shape of a classification; percentages carry two decimals.
#[derive(Serialize)]
struct JsonResult {
    important: f64,
    not_important: f64,
    verdict: Verdict,
    confidence: f64,
    threshold: u8,
}

fn two_decimals(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Render the outcome of `classify`: the warning goes to `err` when there
/// was nothing to classify, otherwise the result goes to `out`.
pub fn write_outcome(
    out: &mut impl Write,
    err: &mut impl Write,
    outcome: &Outcome,
    json: bool,
) -> io::Result<()> {
    match outcome {
        Outcome::NeedsInput => writeln!(err, "{NEEDS_INPUT_WARNING}"),
        Outcome::Classified(result) if json => {
            let view = JsonResult {
                important: two_decimals(result.confidence.important),
                not_important: two_decimals(result.confidence.not_important),
                verdict: result.verdict,
                confidence: two_decimals(result.verdict_confidence()),
                threshold: result.threshold.percent(),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&view)?)
        }
        Outcome::Classified(result) => write_classification(out, result),
    }
}

/// Print a stored training report as a card.
pub fn write_report(out: &mut impl Write, report: &TrainingReport) -> io::Result<()> {
    writeln!(out, "Training")?;
    writeln!(out, "  {:<18} {}", "trained_at", report.trained_at)?;
    writeln!(out, "  {:<18} {}", "train_rows", report.train_rows)?;
    writeln!(out, "  {:<18} {}", "validation_rows", report.validation_rows)?;
    writeln!(out, "  {:<18} {}", "test_rows", report.test_rows)?;
    writeln!(out, "  {:<18} {}", "vocabulary_size", report.vocabulary_size)?;
    writeln!(out)?;
    writeln!(out, "Epochs")?;
    for e in &report.epochs {
        write!(out, "  {:>3}  loss {:.4}  acc {:.4}", e.epoch, e.loss, e.accuracy)?;
        if let (Some(vl), Some(va)) = (e.val_loss, e.val_accuracy) {
            write!(out, "  val_loss {vl:.4}  val_acc {va:.4}")?;
        }
        writeln!(out)?;
    }
    writeln!(out)?;
    writeln!(out, "Test Accuracy: {:.2}%", report.test_accuracy * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailprio_core::Threshold;

    fn render(result: &Classification) -> String {
        let mut buf = Vec::new();
        write_classification(&mut buf, result).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn bar_is_fixed_width() {
        for p in [0.0, 12.5, 50.0, 99.9, 100.0, 150.0, -3.0] {
            assert_eq!(bar(p).chars().count(), BAR_WIDTH, "p = {p}");
        }
        assert!(bar(100.0).chars().all(|c| c == FILL));
        assert!(bar(0.0).chars().all(|c| c == EMPTY));
        assert_eq!(bar(50.0).chars().filter(|&c| c == FILL).count(), BAR_WIDTH / 2);
    }

    #[test]
    fn important_result_rendering() {
        let text = render(&Classification::from_probability(0.82, Threshold::default()));
        assert!(text.contains(" 82.00%"));
        assert!(text.contains(" 18.00%"));
        assert!(text.contains("[+] Classified as Important (82.00% confidence)  (threshold 50%)"));
    }

    fn render_outcome(outcome: &Outcome, json: bool) -> (String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        write_outcome(&mut out, &mut err, outcome, json).unwrap();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn blank_outcome_warns_on_err_only() {
        for json in [false, true] {
            let (out, err) = render_outcome(&Outcome::NeedsInput, json);
            assert!(out.is_empty());
            assert_eq!(err.trim_end(), NEEDS_INPUT_WARNING);
        }
    }

    #[test]
    fn json_outcome_has_two_decimal_percentages() {
        // 0.8199999928474426 is 0.82 after an f32 round trip.
        let result = Classification::from_probability(f64::from(0.82f32), Threshold::default());
        let (out, err) = render_outcome(&Outcome::Classified(result), true);
        assert!(err.is_empty());

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["important"], 82.0);
        assert_eq!(value["not_important"], 18.0);
        assert_eq!(value["confidence"], 82.0);
        assert_eq!(value["verdict"], "important");
        assert_eq!(value["threshold"], 50);
        assert!(!out.contains("81.99"));
    }

    #[test]
    fn text_outcome_matches_classification_rendering() {
        let result = Classification::from_probability(0.3, Threshold::new(40).unwrap());
        let (out, err) = render_outcome(&Outcome::Classified(result), false);
        assert!(err.is_empty());
        assert_eq!(out, render(&result));
        assert!(out.contains("Classified as Not Important (70.00% confidence)"));
    }

    #[test]
    fn not_important_result_rendering() {
        let text = render(&Classification::from_probability(0.5, Threshold::default()));
        assert!(text.contains("[-] Classified as Not Important (50.00% confidence)"));
    }
}
