//! Deterministic JSON rendering of [`Value`]s.
//!
//! Object keys are always sorted, so projected entries print the same way
//! regardless of `HashMap` iteration order.
//!
//! ```
//! use gistql::Value;
//! use gistql::output::{to_json, to_json_pretty};
//!
//! let entry = Value::object([("name", Value::from("Miao")), ("key", Value::from("cat"))]);
//! assert_eq!(to_json(&entry), r#"{"key":"cat","name":"Miao"}"#);
//! assert_eq!(to_json_pretty(&Value::Integer(4)), "4");
//! ```

use std::collections::HashMap;

use crate::{error::ErrorReport, value::Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_value(value, 0, &mut out);
        out
    }

    fn write_value(&self, value: &Value, indent: usize, out: &mut String) {
        match value {
            Value::Null => out.push_str("null"),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(n) => out.push_str(&n.to_string()),
            // JSON has no NaN or infinity
            Value::Float(n) if !n.is_finite() => out.push_str("null"),
            Value::Float(n) => out.push_str(&n.to_string()),
            Value::String(s) => write_string(s, out),
            Value::Array(items) => self.write_array(items, indent, out),
            Value::Object(members) => self.write_object(members, indent, out),
        }
    }

    fn write_array(&self, items: &[Value], indent: usize, out: &mut String) {
        if items.is_empty() {
            out.push_str("[]");
            return;
        }
        out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.newline(indent + 1, out);
            self.write_value(item, indent + 1, out);
        }
        self.newline(indent, out);
        out.push(']');
    }

    fn write_object(&self, members: &HashMap<String, Value>, indent: usize, out: &mut String) {
        if members.is_empty() {
            out.push_str("{}");
            return;
        }
        let mut sorted: Vec<(&String, &Value)> = members.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        out.push('{');
        for (i, (name, value)) in sorted.into_iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            self.newline(indent + 1, out);
            write_string(name, out);
            out.push_str(if self.pretty { ": " } else { ":" });
            self.write_value(value, indent + 1, out);
        }
        self.newline(indent, out);
        out.push('}');
    }

    fn newline(&self, level: usize, out: &mut String) {
        if self.pretty {
            out.push('\n');
            out.push_str(&"  ".repeat(level));
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Compact JSON with sorted keys.
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Two-space indented JSON with sorted keys.
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}

/// The error body returned for rejected requests.
pub fn report_to_json(report: &ErrorReport, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
}
