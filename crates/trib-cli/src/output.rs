use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(&serde_json::to_value(value)?, ui::prefs().term_width),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn render_table(value: &Value, max_width: Option<usize>) -> anyhow::Result<String> {
    match value {
        Value::Array(items) => Ok(array_table(items, max_width)),
        Value::Object(map) => {
            let rows = map
                .iter()
                .map(|(key, value)| vec![key.clone(), value_to_cell(value)])
                .collect::<Vec<_>>();
            Ok(aligned(&["key", "value"], &rows, max_width))
        }
        scalar => Ok(value_to_cell(scalar)),
    }
}

fn array_table(items: &[Value], max_width: Option<usize>) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    if headers.is_empty() {
        let rows = items.iter().map(|v| vec![value_to_cell(v)]).collect::<Vec<_>>();
        return aligned(&["value"], &rows, max_width);
    }

    let rows = items
        .iter()
        .map(|item| {
            headers
                .iter()
                .map(|h| item.get(h).map_or_else(|| String::from("-"), value_to_cell))
                .collect()
        })
        .collect::<Vec<Vec<String>>>();
    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    aligned(&header_refs, &rows, max_width)
}

/// Left-aligned columns separated by two spaces; cells longer than the
/// terminal allows are cut with `...`.
fn aligned(headers: &[&str], rows: &[Vec<String>], max_width: Option<usize>) -> String {
    let cap = max_width.map_or(usize::MAX, |w| (w / headers.len().max(1)).max(8));
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
                .min(cap)
        })
        .collect();

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", truncate(cell, *width)))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header_line = line(headers.to_vec());
    let mut out = vec![header_line.clone(), "-".repeat(header_line.len())];
    out.extend(rows.iter().map(|row| line(row.iter().map(String::as_str).collect())));
    out.join("\n")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}
