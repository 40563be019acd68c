//! SQL construction and response-table parsing for Soil Data Access.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use trib_core::hsg;

use crate::SoilRecord;
use crate::error::SoilError;

/// Upper-cased, trimmed, de-duplicated symbols in first-seen order.
#[must_use]
pub fn normalize_symbols<I, S>(symbols: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    symbols
        .into_iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

/// Double single quotes for a T-SQL string literal.
#[must_use]
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Dominant-component hydrologic group for each map unit symbol in an area.
#[must_use]
pub fn build_sql(area_symbol: &str, symbols: &[String]) -> String {
    let quoted = symbols
        .iter()
        .map(|s| format!("'{}'", escape_literal(s)))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "SELECT m.musym, m.muname, \
         (SELECT TOP 1 c.hydgrp FROM component c WHERE c.mukey = m.mukey ORDER BY c.comppct_r DESC) AS hsg \
         FROM legend l JOIN mapunit m ON l.lkey = m.lkey \
         WHERE l.areasymbol = '{}' AND m.musym IN ({quoted})",
        escape_literal(&area_symbol.trim().to_uppercase())
    )
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn field<'a>(row: &'a serde_json::Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| {
        row.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

/// Parse the `Table` of a Soil Data Access JSON response.
///
/// Accepts a header row followed by array rows (`JSON+COLUMNNAME`), plain
/// array rows in `musym, muname, hsg` order (`JSON`), or object rows. A
/// response without `Table` means no matches.
///
/// # Errors
///
/// Returns [`SoilError::Parse`] when `Table` is present but not an array.
pub fn parse_table(body: &Value) -> Result<Vec<SoilRecord>, SoilError> {
    let Some(table) = body.get("Table") else {
        return Ok(Vec::new());
    };
    let rows = table
        .as_array()
        .ok_or_else(|| SoilError::Parse("`Table` is not an array".to_string()))?;

    let mut columns: HashMap<String, usize> = ["musym", "muname", "hsg"]
        .iter()
        .enumerate()
        .map(|(i, name)| ((*name).to_string(), i))
        .collect();
    let mut records = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let (musym, muname, group) = match row {
            Value::Array(cells) => {
                let is_header = index == 0
                    && cells
                        .iter()
                        .any(|c| c.as_str().is_some_and(|s| s.eq_ignore_ascii_case("musym")));
                if is_header {
                    columns = cells
                        .iter()
                        .enumerate()
                        .map(|(i, c)| (cell_text(c).to_lowercase(), i))
                        .collect();
                    continue;
                }
                let cell = |name: &str| {
                    columns
                        .get(name)
                        .and_then(|&i| cells.get(i))
                        .map(cell_text)
                        .unwrap_or_default()
                };
                (cell("musym"), cell("muname"), cell("hsg"))
            }
            Value::Object(map) => {
                let get = |names: &[&str]| field(map, names).map(cell_text).unwrap_or_default();
                (
                    get(&["musym"]),
                    get(&["muname"]),
                    get(&["hsg", "hydgrp"]),
                )
            }
            _ => continue,
        };

        let musym = musym.to_uppercase();
        if musym.is_empty() {
            continue;
        }
        records.push(SoilRecord {
            musym,
            muname,
            hsg: hsg::simplify(&group),
        });
    }
    Ok(records)
}

/// One record per requested symbol, in request order; the first returned
/// row for a symbol wins and unknown symbols get blank fields.
#[must_use]
pub fn order_results(requested: &[String], fetched: Vec<SoilRecord>) -> Vec<SoilRecord> {
    let mut by_symbol: HashMap<String, SoilRecord> = HashMap::new();
    for record in fetched {
        by_symbol.entry(record.musym.clone()).or_insert(record);
    }
    requested
        .iter()
        .map(|symbol| {
            by_symbol.remove(symbol).unwrap_or_else(|| SoilRecord {
                musym: symbol.clone(),
                muname: String::new(),
                hsg: String::new(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn symbols_are_deduplicated_case_insensitively() {
        assert_eq!(
            normalize_symbols(["wsB", " WsB ", "", "PaA"]),
            vec!["WSB".to_string(), "PAA".to_string()]
        );
    }

    #[test]
    fn sql_escapes_quotes() {
        let sql = build_sql("ny103", &["O'B".to_string(), "PAA".to_string()]);
        assert!(sql.contains("l.areasymbol = 'NY103'"));
        assert!(sql.contains("m.musym IN ('O''B','PAA')"));
        assert!(sql.contains("ORDER BY c.comppct_r DESC"));
    }

    #[test]
    fn parses_header_rows() {
        let body = json!({"Table": [
            ["musym", "muname", "hsg"],
            ["WsB", "Wallington silt loam", "C/D"],
            ["PaA", "Palmyra gravelly loam", null]
        ]});
        let records = parse_table(&body).expect("parse");
        assert_eq!(
            records,
            vec![
                SoilRecord {
                    musym: "WSB".into(),
                    muname: "Wallington silt loam".into(),
                    hsg: "C".into()
                },
                SoilRecord {
                    musym: "PAA".into(),
                    muname: "Palmyra gravelly loam".into(),
                    hsg: String::new()
                },
            ]
        );
    }

    #[test]
    fn parses_plain_and_object_rows() {
        let plain = json!({"Table": [["HnB", "Honeoye loam", "B"]]});
        assert_eq!(parse_table(&plain).expect("parse")[0].hsg, "B");

        let objects = json!({"Table": [{"MUSYM": "hnb", "MUNAME": "Honeoye", "hydgrp": "b"}]});
        let records = parse_table(&objects).expect("parse");
        assert_eq!(records[0].musym, "HNB");
        assert_eq!(records[0].hsg, "B");
    }

    #[test]
    fn missing_table_means_no_matches() {
        assert!(parse_table(&json!({})).expect("parse").is_empty());
        assert!(parse_table(&json!({"Table": "oops"})).is_err());
    }

    #[test]
    fn results_follow_request_order() {
        let requested = vec!["A1".to_string(), "B2".to_string()];
        let fetched = vec![SoilRecord {
            musym: "B2".into(),
            muname: "Bee".into(),
            hsg: "D".into(),
        }];
        let ordered = order_results(&requested, fetched);
        assert_eq!(ordered[0].musym, "A1");
        assert_eq!(ordered[0].hsg, "");
        assert_eq!(ordered[1].hsg, "D");
    }
}
