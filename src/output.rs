// Output layer: indented, syntax-highlighted JSON for results, colored
// one-liners for status messages, and a spinner for the slow (upload)
// calls. `colored` honors NO_COLOR and non-TTY output on its own.

use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Print a typed model as highlighted JSON.
pub fn print_typed<T: Serialize>(value: &T) -> Result<()> {
    let value = serde_json::to_value(value)?;
    println!("{}", highlight(&value, 0));
    Ok(())
}

/// Print a raw response body. JSON bodies are re-indented and highlighted;
/// anything else is printed verbatim.
pub fn print_raw(body: &str) {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => println!("{}", highlight(&value, 0)),
        Err(_) => println!("{body}"),
    }
}

pub fn success(message: &str) {
    println!("{} {message}", "✓".green().bold());
}

pub fn info(message: &str) {
    println!("{} {message}", "✓".cyan());
}

pub fn error(message: &str) {
    eprintln!("{} {message}", "Error:".red().bold());
}

/// Spinner shown while a request is in flight. Hidden automatically when
/// stderr is not a terminal.
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn highlight(value: &Value, indent: usize) -> String {
    let pad = "  ".repeat(indent);
    match value {
        Value::Null => "null".magenta().to_string(),
        Value::Bool(flag) => flag.to_string().magenta().to_string(),
        Value::Number(number) => number.to_string().yellow().to_string(),
        Value::String(text) => quote(text).green().to_string(),
        Value::Array(items) => {
            if items.is_empty() {
                return "[]".to_string();
            }
            let inner: Vec<String> = items
                .iter()
                .map(|item| format!("{pad}  {}", highlight(item, indent + 1)))
                .collect();
            format!("[\n{}\n{pad}]", inner.join(",\n"))
        }
        Value::Object(map) => {
            if map.is_empty() {
                return "{}".to_string();
            }
            let inner: Vec<String> = map
                .iter()
                .map(|(key, item)| {
                    format!(
                        "{pad}  {}: {}",
                        quote(key).cyan(),
                        highlight(item, indent + 1)
                    )
                })
                .collect();
            format!("{{\n{}\n{pad}}}", inner.join(",\n"))
        }
    }
}

/// JSON-quote a string, falling back to debug formatting if serialization
/// somehow fails.
fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("{text:?}"))
}
