use h41_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render(envelope: &Envelope<Value>, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(envelope)?),
    }

    Ok(())
}

fn render_table(envelope: &Envelope<Value>) -> Result<String, CliError> {
    let mut out = String::new();
    out.push_str(&format!("request_id  : {}\n", envelope.meta.request_id));
    out.push_str(&format!("schema      : {}\n", envelope.meta.schema_version));
    out.push_str(&format!("generated_at: {}\n", envelope.meta.generated_at));
    out.push_str(&format!("latency_ms  : {}\n", envelope.meta.latency_ms));

    if !envelope.meta.warnings.is_empty() {
        out.push_str("warnings:\n");
        for warning in &envelope.meta.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }

    match envelope.data.get("fields").and_then(Value::as_object) {
        Some(fields) => {
            out.push_str(&format!(
                "{:<32} {:>16} {:>14} {:>14}\n",
                "field", "current", "weekly", "yearly"
            ));
            for (key, value) in fields {
                out.push_str(&format!(
                    "{:<32} {:>16} {:>14} {:>14}\n",
                    key,
                    cell(value.get("current")),
                    cell(value.get("weeklyChange")),
                    cell(value.get("yearlyChange")),
                ));
            }
        }
        None => {
            out.push_str("data:\n");
            for line in serde_json::to_string_pretty(&envelope.data)?.lines() {
                out.push_str(&format!("  {line}\n"));
            }
        }
    }

    if !envelope.errors.is_empty() {
        out.push_str("errors:\n");
        for error in &envelope.errors {
            out.push_str(&format!("  - {}: {}\n", error.code, error.message));
        }
    }

    Ok(out)
}

fn cell(value: Option<&Value>) -> String {
    match value.and_then(Value::as_f64) {
        Some(number) => format!("{number:.0}"),
        None => String::from("n.a."),
    }
}
