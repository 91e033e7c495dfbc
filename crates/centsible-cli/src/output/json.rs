use std::io;

use centsible_client::{ClientError, SuccessEnvelope};
use serde::Serialize;
use serde_json::{Value, json};

const JSON_VERSION: &str = "v1";

pub fn render_success_json(success: &SuccessEnvelope) -> io::Result<String> {
    let value = match success.command.as_str() {
        "category list" | "txn list" | "budget list" => render_rows_json(&success.data),
        "category add" | "txn add" | "txn import" | "budget set" | "budget remove"
        | "progress" | "insights" => render_envelope_json(&success.data),
        _ => {
            return Err(io::Error::other(format!(
                "JSON output is not supported for command `{}`",
                success.command
            )));
        }
    };

    serialize_json_pretty(&value)
}

pub fn render_error_json(error: &ClientError) -> io::Result<String> {
    let payload = json!({
        "error": {
            "code": error.code,
            "message": error.message,
            "recovery_steps": error.recovery_steps,
        }
    });
    serialize_json_pretty(&payload)
}

/// List commands emit the raw rows array so shell pipelines can feed
/// `jq` without unwrapping an envelope first.
fn render_rows_json(data: &Value) -> Value {
    let rows = data
        .get("rows")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    Value::Array(rows)
}

fn render_envelope_json(data: &Value) -> Value {
    json!({
        "ok": true,
        "version": JSON_VERSION,
        "data": data.clone()
    })
}

fn serialize_json_pretty<T>(value: &T) -> io::Result<String>
where
    T: Serialize,
{
    serde_json::to_string_pretty(value).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use centsible_client::SuccessEnvelope;
    use serde_json::{Value, json};

    use super::{render_error_json, render_success_json};

    fn success(command: &str, data: Value) -> SuccessEnvelope {
        SuccessEnvelope {
            ok: true,
            command: command.to_string(),
            version: "0.1.0".to_string(),
            data,
        }
    }

    #[test]
    fn list_commands_return_raw_arrays() {
        let payload = success(
            "budget list",
            json!({
                "rows": [
                    {"budget_id": "bud_1", "category": "Groceries", "amount": 400.0, "period": "monthly"}
                ]
            }),
        );

        let rendered = render_success_json(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert!(value.is_array());
                assert_eq!(value[0]["budget_id"], Value::String("bud_1".to_string()));
            }
        }
    }

    #[test]
    fn insights_json_uses_structured_envelope() {
        let payload = success(
            "insights",
            json!({
                "policy_version": "insights/v1",
                "total_spent": 1000.0
            }),
        );

        let rendered = render_success_json(&payload);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(value["ok"], Value::Bool(true));
                assert_eq!(value["version"], Value::String("v1".to_string()));
                assert_eq!(
                    value["data"]["policy_version"],
                    Value::String("insights/v1".to_string())
                );
            }
        }
    }

    #[test]
    fn runtime_error_json_uses_universal_shape() {
        let error = centsible_client::ClientError::new(
            "budget_not_found",
            "missing",
            vec!["run `centsible budget list`".to_string()],
        );
        let rendered = render_error_json(&error);
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            let parsed: Result<Value, _> = serde_json::from_str(&text);
            assert!(parsed.is_ok());
            if let Ok(value) = parsed {
                assert_eq!(
                    value["error"]["code"],
                    Value::String("budget_not_found".to_string())
                );
                assert!(value.get("ok").is_none());
            }
        }
    }

    #[test]
    fn unsupported_command_is_rejected() {
        let payload = success("unknown", json!({}));
        let rendered = render_success_json(&payload);
        assert!(rendered.is_err());
    }
}
