use anyhow::{Result, bail};
use chrono::{DateTime, Local, Utc};
use pausegate_core::Parameters;
use serde_json::Value;

pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    let Some(ts) = timestamp else {
        return "-".to_string();
    };
    ts.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Parse `key=value` pairs. Numbers and booleans keep their JSON type;
/// anything else is a string.
pub fn parse_params(raw: &[String]) -> Result<Parameters> {
    let mut params = Parameters::new();
    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid parameter `{pair}`: expected KEY=VALUE");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("Invalid parameter `{pair}`: key is empty");
        }
        params.insert(key.to_string(), parse_value(value));
    }
    Ok(params)
}

fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}
