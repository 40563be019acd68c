//! Discharge-point names.
//!
//! Surveyors write the same outlet as `DP1`, `dp_01`, `DP#1` or just `1`.
//! Everything numeric inside the configured range collapses to `DP-NN`;
//! anything else is kept verbatim.

/// Prefix shared by all canonical discharge-point names.
pub const DP_PREFIX: &str = "DP-";

/// Format a 1-based discharge point index as `DP-NN`.
#[must_use]
pub fn format_discharge_point(index: u32) -> String {
    format!("{DP_PREFIX}{index:02}")
}

/// `true` for names of the exact form `DP-` followed by two digits.
#[must_use]
pub fn is_discharge_point_name(name: &str) -> bool {
    name.strip_prefix(DP_PREFIX)
        .is_some_and(|digits| digits.len() == 2 && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Canonicalize a raw discharge-point label.
///
/// Returns `DP-NN` when the label encodes a number in `1..=max`, otherwise
/// the trimmed input.
#[must_use]
pub fn canonicalize_discharge_point(raw: &str, max: u32) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let compact: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let digits = compact.strip_prefix("DP").map_or(compact.as_str(), |rest| {
        let rest = rest.strip_prefix("POINT").unwrap_or(rest);
        rest.strip_prefix(['-', '_', '#']).unwrap_or(rest)
    });

    let is_number = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && digits.trim_start_matches('0').len() <= 3;
    let number = if is_number {
        digits.parse::<u32>().ok()
    } else {
        None
    };

    match number {
        Some(n) if (1..=max).contains(&n) => format_discharge_point(n),
        _ => trimmed.to_string(),
    }
}
