use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Report success: a `{"success": true, "message", ..data}` object with
/// `--json`, a single check-marked line otherwise.
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    if let OutputFormat::Text = output_format {
        println!("✓ {}", message);
        return Ok(());
    }

    let mut body = json!({ "success": true, "message": message });
    if let (Some(body), Some(Value::Object(extra))) = (body.as_object_mut(), data) {
        body.extend(extra);
    }
    print_json(&body)
}

/// Report failure on stdout with `--json` so scripts can parse it, on stderr otherwise
pub fn output_error(output_format: &OutputFormat, message: &str, code: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_json(&json!({ "success": false, "error": message, "error_code": code })),
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
            Ok(())
        }
    }
}

fn print_json(body: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_success_merges_object_data() {
        assert!(output_success(&OutputFormat::Json, "ok", Some(json!({ "id": 1 }))).is_ok());
        assert!(output_success(&OutputFormat::Json, "ok", Some(json!("not an object"))).is_ok());
        assert!(output_error(&OutputFormat::Json, "down", "UNHEALTHY").is_ok());
    }
}
