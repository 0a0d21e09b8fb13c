use anyhow::Result;
use clap::ValueEnum;
use serde_json::Value;
use sumo_search::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The page as returned, pretty printed
    Json,
    /// Messages only, with JSON embedded in string fields expanded
    Yaml,
    /// One `_raw` line per message
    Raw,
}

pub fn render(result: &SearchResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Yaml => {
            let messages: Vec<Value> = result
                .messages
                .iter()
                .map(|m| expand_embedded_json(Value::Object(m.map.clone())))
                .collect();
            Ok(serde_yaml::to_string(&messages)?)
        }
        OutputFormat::Raw => Ok(result
            .messages
            .iter()
            .filter_map(|m| m.raw())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Replaces string values that hold JSON objects or arrays with the parsed value.
fn expand_embedded_json(v: Value) -> Value {
    match v {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, val)| (k, expand_embedded_json(val)))
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.into_iter().map(expand_embedded_json).collect()),
        Value::String(s) => match serde_json::from_str::<Value>(&s) {
            // Numeric-looking ids like "_messageid" stay strings
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => expand_embedded_json(parsed),
            _ => Value::String(s),
        },
        _ => v,
    }
}
