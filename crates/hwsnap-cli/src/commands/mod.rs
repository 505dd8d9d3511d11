pub mod overview;
pub mod sensors;

use hwsnap_core::{FOOTER, Report};
use serde_json::{Map, Value};

/// Lay out items as the text snapshot: every item followed by a blank
/// line, closed by the footer.
pub fn render_text(items: &[(&'static str, Box<dyn Report>)]) -> String {
    let mut out = String::new();
    for (_, item) in items {
        out.push_str(&item.to_string());
        out.push_str("\n\n");
    }
    out.push_str(FOOTER);
    out
}

/// Collect items into one JSON document keyed by item name.
pub fn snapshot_json(items: &[(&'static str, Box<dyn Report>)]) -> Value {
    let mut doc = Map::new();
    for (name, item) in items {
        doc.insert((*name).to_string(), item.to_json());
    }
    Value::Object(doc)
}

/// Pretty-print a JSON document to stdout.
pub fn print_json(value: &Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap());
}
