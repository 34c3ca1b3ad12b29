//! Series fetching abstractions and raw observation types

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// A single observation as reported by the statistics provider.
///
/// All fields are kept as received; parsing happens in
/// [`crate::core::normalize`], where failures become missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub period: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
}

impl RawObservation {
    pub fn new(year: impl ToString, period: &str, value: &str) -> Self {
        Self {
            year: year.to_string(),
            period: period.to_string(),
            value: value.to_string(),
        }
    }
}

// BLS sends strings, but numbers show up in hand-made payloads. Nulls and
// other JSON types become an empty string so one bad cell never fails the
// whole response.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Retrieves raw observations for one series over an inclusive year range.
///
/// Implementations never fail: any transport or payload problem is logged and
/// reported as an empty list, which callers treat as "series unavailable".
#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    async fn fetch(&self, series_id: &str, start_year: i32, end_year: i32) -> Vec<RawObservation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_observation_accepts_string_and_numeric_fields() {
        let json = r#"[
            {"year": "2023", "period": "M01", "periodName": "January", "value": "157.3", "footnotes": [{}]},
            {"year": 2023, "period": "M02", "value": 158}
        ]"#;

        let observations: Vec<RawObservation> = serde_json::from_str(json).unwrap();
        assert_eq!(observations[0], RawObservation::new(2023, "M01", "157.3"));
        assert_eq!(observations[1], RawObservation::new("2023", "M02", "158"));
    }

    #[test]
    fn test_raw_observation_tolerates_null_and_missing_fields() {
        let json = r#"[
            {"year": "2023", "period": "M03", "value": null},
            {"year": "2023", "period": "M04", "value": {"nested": true}},
            {"year": "2023", "period": "M05"},
            {"year": null, "period": "M06", "value": "3.5"}
        ]"#;

        let observations: Vec<RawObservation> = serde_json::from_str(json).unwrap();
        assert_eq!(observations[0], RawObservation::new(2023, "M03", ""));
        assert_eq!(observations[1], RawObservation::new(2023, "M04", ""));
        assert_eq!(observations[2], RawObservation::new(2023, "M05", ""));
        assert_eq!(observations[3], RawObservation::new("", "M06", "3.5"));
    }
}
