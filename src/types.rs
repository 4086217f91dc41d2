use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Encoding used when the terminal payload is written out.
///
/// - `Text`: strings are written verbatim, any other value as pretty JSON.
/// - `Json`: the payload is always written as pretty JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "invalid output_format: {other} (expected \"text\" or \"json\")"
            )),
        }
    }
}

/// Parse a duration string such as `"500ms"`, `"30s"`, `"5m"` or `"1h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let too_large = || format!("duration '{s}' is too large");
    let duration = match unit.as_str() {
        "ms" => Duration::from_millis(value),
        "s" => Duration::from_secs(value),
        "m" => Duration::from_secs(value.checked_mul(60).ok_or_else(too_large)?),
        "h" => Duration::from_secs(value.checked_mul(60 * 60).ok_or_else(too_large)?),
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    if duration.is_zero() {
        return Err(format!("duration '{s}' must be greater than zero"));
    }

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration(" 30s "), Ok(Duration::from_secs(30)));
        assert_eq!(parse_duration("5m"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_duration("2H"), Ok(Duration::from_secs(7200)));
    }

    #[test]
    fn rejects_missing_unit_and_zero() {
        assert!(parse_duration("30").unwrap_err().contains("unit suffix"));
        assert!(parse_duration("0s").unwrap_err().contains("greater than zero"));
        assert!(parse_duration("10d").unwrap_err().contains("unsupported"));
    }

    #[test]
    fn oversized_minutes_and_hours_are_errors() {
        let err = parse_duration("307445734561825861m").unwrap_err();
        assert!(err.contains("too large"), "{err}");
        let err = parse_duration(&format!("{}h", u64::MAX / 60)).unwrap_err();
        assert!(err.contains("too large"), "{err}");
    }
}
