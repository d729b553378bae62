//! Report rows as delivered by the two campaign report queries

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// One conversion occurrence for a campaign on a given date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionEvent {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "CampaignName")]
    pub campaign_name: String,
    #[serde(rename = "ConversionTypeName")]
    pub category: String,
}

impl ConversionEvent {
    pub fn new(
        date: impl Into<String>,
        campaign_name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            campaign_name: campaign_name.into(),
            category: category.into(),
        }
    }
}

/// A dated row of either report export
pub trait ReportRow: DeserializeOwned {
    fn date(&self) -> &str;

    /// Parse one row from a JSONL line
    fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

impl ReportRow for ConversionEvent {
    fn date(&self) -> &str {
        &self.date
    }
}

/// One performance snapshot for a campaign on a given date.
///
/// Numeric columns stay as report text until [`ParsedMetrics::from_row`]
/// coerces them, so a malformed value surfaces as a merge error rather than
/// a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "CampaignName")]
    pub campaign_name: String,
    #[serde(rename = "Clicks", deserialize_with = "deserialize_report_text")]
    pub clicks: String,
    #[serde(rename = "Conversions", deserialize_with = "deserialize_report_text")]
    pub conversions: String,
    #[serde(rename = "Impressions", deserialize_with = "deserialize_report_text")]
    pub impressions: String,
    #[serde(rename = "Ctr", deserialize_with = "deserialize_report_text")]
    pub ctr: String,
    #[serde(rename = "AverageCpc", deserialize_with = "deserialize_report_text")]
    pub avg_cpc: String,
    #[serde(rename = "Cost", deserialize_with = "deserialize_report_text")]
    pub cost: String,
}

impl ReportRow for MetricRow {
    fn date(&self) -> &str {
        &self.date
    }
}

/// Numeric metrics after coercion. Also used as the running total per key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedMetrics {
    pub clicks: i64,
    pub conversions: f64,
    pub impressions: i64,
    pub ctr: f64,
    pub avg_cpc: f64,
    pub cost: f64,
}

impl ParsedMetrics {
    pub fn from_row(row: &MetricRow) -> Result<Self, MetricParseError> {
        Ok(Self {
            clicks: parse_report_int("Clicks", &row.clicks)?,
            conversions: parse_report_float("Conversions", &row.conversions)?,
            impressions: parse_report_int("Impressions", &row.impressions)?,
            ctr: parse_report_float("Ctr", &row.ctr)?,
            avg_cpc: parse_report_float("AverageCpc", &row.avg_cpc)?,
            cost: parse_report_float("Cost", &row.cost)?,
        })
    }

    /// Field-wise sum. Ratio columns (ctr, avg_cpc) are summed like the rest.
    /// On overflow the running total is left unchanged.
    pub fn accumulate(&mut self, other: &ParsedMetrics) -> Result<(), MetricOverflowError> {
        let total = ParsedMetrics {
            clicks: checked_sum_int("Clicks", self.clicks, other.clicks)?,
            conversions: checked_sum_float("Conversions", self.conversions, other.conversions)?,
            impressions: checked_sum_int("Impressions", self.impressions, other.impressions)?,
            ctr: checked_sum_float("Ctr", self.ctr, other.ctr)?,
            avg_cpc: checked_sum_float("AverageCpc", self.avg_cpc, other.avg_cpc)?,
            cost: checked_sum_float("Cost", self.cost, other.cost)?,
        };
        *self = total;
        Ok(())
    }
}

fn checked_sum_int(field: &'static str, a: i64, b: i64) -> Result<i64, MetricOverflowError> {
    a.checked_add(b).ok_or(MetricOverflowError { field })
}

fn checked_sum_float(field: &'static str, a: f64, b: f64) -> Result<f64, MetricOverflowError> {
    let sum = a + b;
    if sum.is_finite() {
        Ok(sum)
    } else {
        Err(MetricOverflowError { field })
    }
}

/// A running total left the range of its numeric type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricOverflowError {
    pub field: &'static str,
}

impl fmt::Display for MetricOverflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "total for field {} overflowed", self.field)
    }
}

impl Error for MetricOverflowError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricParseError {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for MetricParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field {} has non-numeric value {:?}", self.field, self.value)
    }
}

impl Error for MetricParseError {}

fn normalize_numeric(text: &str) -> String {
    text.trim().chars().filter(|c| *c != ',').collect()
}

fn parse_report_int(field: &'static str, text: &str) -> Result<i64, MetricParseError> {
    normalize_numeric(text)
        .parse::<i64>()
        .map_err(|_| MetricParseError {
            field,
            value: text.to_string(),
        })
}

fn parse_report_float(field: &'static str, text: &str) -> Result<f64, MetricParseError> {
    let normalized = normalize_numeric(text);
    let digits = normalized
        .strip_suffix('%')
        .map(str::trim_end)
        .unwrap_or(&normalized);

    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(MetricParseError {
            field,
            value: text.to_string(),
        }),
    }
}

/// Accepts a JSON string or number (or a CSV cell) and keeps it as text
fn deserialize_report_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ReportTextVisitor;

    impl<'de> Visitor<'de> for ReportTextVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or a number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(ReportTextVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric_row(clicks: &str, ctr: &str, cost: &str) -> MetricRow {
        MetricRow {
            date: "20240101".to_string(),
            campaign_name: "C1".to_string(),
            clicks: clicks.to_string(),
            conversions: "1.0".to_string(),
            impressions: "100".to_string(),
            ctr: ctr.to_string(),
            avg_cpc: "0.5".to_string(),
            cost: cost.to_string(),
        }
    }

    #[test]
    fn test_parse_conversion_jsonl() {
        let line = r#"{"Date":"20240101","CampaignName":"Brand - Search","ConversionTypeName":"GetEstimate"}"#;

        let event = ConversionEvent::from_jsonl(line).unwrap();
        assert_eq!(event.date, "20240101");
        assert_eq!(event.campaign_name, "Brand - Search");
        assert_eq!(event.category, "GetEstimate");
    }

    #[test]
    fn test_parse_metric_jsonl_with_mixed_types() {
        let line = r#"{"Date":"20240101","CampaignName":"C1","Clicks":10,"Conversions":"1.5","Impressions":"1,200","Ctr":"0.83%","AverageCpc":0.5,"Cost":"5.00"}"#;

        let row = MetricRow::from_jsonl(line).unwrap();
        assert_eq!(row.clicks, "10");
        assert_eq!(row.impressions, "1,200");
        assert_eq!(row.avg_cpc, "0.5");

        let metrics = ParsedMetrics::from_row(&row).unwrap();
        assert_eq!(metrics.clicks, 10);
        assert_eq!(metrics.conversions, 1.5);
        assert_eq!(metrics.impressions, 1200);
        assert_eq!(metrics.ctr, 0.83);
        assert_eq!(metrics.avg_cpc, 0.5);
        assert_eq!(metrics.cost, 5.0);
    }

    #[test]
    fn test_malformed_jsonl() {
        let line = r#"{"Date": "20240101""#;
        assert!(ConversionEvent::from_jsonl(line).is_err());
        assert!(MetricRow::from_jsonl(line).is_err());
    }

    #[test]
    fn test_non_numeric_clicks_is_rejected() {
        let err = ParsedMetrics::from_row(&metric_row("ten", "1.0", "5.0")).unwrap_err();
        assert_eq!(err.field, "Clicks");
        assert_eq!(err.value, "ten");
    }

    #[test]
    fn test_fractional_integer_field_is_rejected() {
        let err = ParsedMetrics::from_row(&metric_row("10.5", "1.0", "5.0")).unwrap_err();
        assert_eq!(err.field, "Clicks");
    }

    #[test]
    fn test_empty_and_placeholder_values_are_rejected() {
        assert_eq!(
            ParsedMetrics::from_row(&metric_row("10", "1.0", "")).unwrap_err().field,
            "Cost"
        );
        assert_eq!(
            ParsedMetrics::from_row(&metric_row("10", "--", "5.0")).unwrap_err().field,
            "Ctr"
        );
        assert_eq!(
            ParsedMetrics::from_row(&metric_row("10", "NaN", "5.0")).unwrap_err().field,
            "Ctr"
        );
    }

    #[test]
    fn test_accumulate_sums_every_field() {
        let mut total = ParsedMetrics::default();
        total
            .accumulate(&ParsedMetrics::from_row(&metric_row("10", "1.0", "5.0")).unwrap())
            .unwrap();
        total
            .accumulate(&ParsedMetrics::from_row(&metric_row("4", "2.5%", "3.0")).unwrap())
            .unwrap();

        assert_eq!(total.clicks, 14);
        assert_eq!(total.impressions, 200);
        assert_eq!(total.conversions, 2.0);
        assert_eq!(total.ctr, 3.5);
        assert_eq!(total.avg_cpc, 1.0);
        assert_eq!(total.cost, 8.0);
    }

    #[test]
    fn test_integer_overflow_leaves_total_unchanged() {
        let max = ParsedMetrics::from_row(&metric_row("9223372036854775807", "1.0", "5.0")).unwrap();
        let mut total = ParsedMetrics::default();
        total.accumulate(&max).unwrap();

        let err = total.accumulate(&max).unwrap_err();
        assert_eq!(err.field, "Clicks");
        assert_eq!(total, max);
    }

    #[test]
    fn test_float_overflow_is_rejected() {
        let huge = ParsedMetrics::from_row(&metric_row("1", "1.0", "1e308")).unwrap();
        let mut total = ParsedMetrics::default();
        total.accumulate(&huge).unwrap();

        assert_eq!(total.accumulate(&huge).unwrap_err().field, "Cost");
    }
}
