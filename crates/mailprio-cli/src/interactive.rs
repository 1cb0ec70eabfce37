//! Line-oriented interactive session: prompt, classify, render, repeat.

use std::io::{BufRead, Write};

use mailprio_ai::{InferenceContext, Outcome};
use mailprio_core::Threshold;
use tracing::warn;

use crate::display;

pub const NEEDS_INPUT_WARNING: &str = "Please enter some text to check.";

/// Run until end of input. The threshold persists across rounds; a blank
/// threshold answer keeps the current value.
pub fn run(
    ctx: &InferenceContext,
    mut threshold: Threshold,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    writeln!(out, "Email priority classifier. Ctrl-D to quit.")?;
    loop {
        writeln!(out)?;
        let Some(subject) = prompt(input, out, "Email Subject: ")? else {
            break;
        };
        let Some(body) = prompt(input, out, "Email Body: ")? else {
            break;
        };
        let Some(answer) = prompt(
            input,
            out,
            &format!(
                "Importance Threshold ({}-{}) [{}]: ",
                Threshold::MIN,
                Threshold::MAX,
                threshold.percent()
            ),
        )?
        else {
            break;
        };

        if !answer.trim().is_empty() {
            match answer.parse::<Threshold>() {
                Ok(t) => threshold = t,
                Err(e) => {
                    warn!(error = %e, "ignoring threshold");
                    writeln!(out, "{e}; keeping {threshold}")?;
                }
            }
        }

        match ctx.classify(&subject, &body, threshold)? {
            Outcome::NeedsInput => writeln!(out, "{NEEDS_INPUT_WARNING}")?,
            Outcome::Classified(result) => display::write_classification(out, &result)?,
        }
    }
    Ok(())
}

/// Print `label` and read one line without its terminator. `None` at EOF.
fn prompt(input: &mut impl BufRead, out: &mut impl Write, label: &str) -> anyhow::Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed_len);
    Ok(Some(line))
}
