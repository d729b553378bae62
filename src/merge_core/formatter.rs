//! Sorted, fixed-layout projection of the merged table

use super::accumulator::{AccumulatorTable, MergedRecord};
use super::category::ConversionCategory;
use serde::{Deserialize, Serialize};

pub const OUTPUT_COLUMNS: usize = 12;

pub const OUTPUT_HEADER: [&str; OUTPUT_COLUMNS] = [
    "Date",
    "Campaign Name",
    "Get Estimate",
    "Whatsapp Button Click",
    "Begin Booking",
    "Submit Booking",
    "Clicks",
    "Conversions",
    "Impressions",
    "CTR",
    "Avg CPC",
    "Cost",
];

/// One line of the merged report, columns in header order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Campaign Name")]
    pub campaign_name: String,
    #[serde(rename = "Get Estimate")]
    pub get_estimate: u64,
    #[serde(rename = "Whatsapp Button Click")]
    pub whatsapp_button_click: u64,
    #[serde(rename = "Begin Booking")]
    pub begin_booking: u64,
    #[serde(rename = "Submit Booking")]
    pub submit_booking: u64,
    #[serde(rename = "Clicks")]
    pub clicks: i64,
    #[serde(rename = "Conversions")]
    pub conversions: f64,
    #[serde(rename = "Impressions")]
    pub impressions: i64,
    #[serde(rename = "CTR")]
    pub ctr: f64,
    #[serde(rename = "Avg CPC")]
    pub avg_cpc: f64,
    #[serde(rename = "Cost")]
    pub cost: f64,
}

impl OutputRow {
    pub fn from_record(record: &MergedRecord) -> Self {
        Self {
            date: record.date.clone(),
            campaign_name: record.campaign_name.clone(),
            get_estimate: record.conversion_count(ConversionCategory::GetEstimate),
            whatsapp_button_click: record.conversion_count(ConversionCategory::WhatsappButtonClick),
            begin_booking: record.conversion_count(ConversionCategory::BeginBooking),
            submit_booking: record.conversion_count(ConversionCategory::SubmitBooking),
            clicks: record.metrics.clicks,
            conversions: record.metrics.conversions,
            impressions: record.metrics.impressions,
            ctr: record.metrics.ctr,
            avg_cpc: record.metrics.avg_cpc,
            cost: record.metrics.cost,
        }
    }

    /// Cell text in header order, for tabular sinks
    pub fn cells(&self) -> [String; OUTPUT_COLUMNS] {
        [
            self.date.clone(),
            self.campaign_name.clone(),
            self.get_estimate.to_string(),
            self.whatsapp_button_click.to_string(),
            self.begin_booking.to_string(),
            self.submit_booking.to_string(),
            self.clicks.to_string(),
            self.conversions.to_string(),
            self.impressions.to_string(),
            self.ctr.to_string(),
            self.avg_cpc.to_string(),
            self.cost.to_string(),
        ]
    }
}

/// Project every merged record into an output row, ordered by date then
/// campaign name (byte-wise). Dates must be fixed-width for this to be
/// chronological.
pub fn format(table: &AccumulatorTable) -> Vec<OutputRow> {
    let mut records: Vec<&MergedRecord> = table.records().collect();

    records.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.campaign_name.cmp(&b.campaign_name))
    });

    records.into_iter().map(OutputRow::from_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge_core::accumulator::aggregate;
    use crate::merge_core::records::{ConversionEvent, MetricRow};

    fn metric(date: &str, campaign: &str) -> MetricRow {
        MetricRow {
            date: date.to_string(),
            campaign_name: campaign.to_string(),
            clicks: "10".to_string(),
            conversions: "1.0".to_string(),
            impressions: "100".to_string(),
            ctr: "1.0".to_string(),
            avg_cpc: "0.5".to_string(),
            cost: "5.0".to_string(),
        }
    }

    #[test]
    fn test_single_merged_row_layout() {
        let conversions = vec![
            ConversionEvent::new("20240101", "C1", "GetEstimate"),
            ConversionEvent::new("20240101", "C1", "GetEstimate"),
        ];
        let metrics = vec![metric("20240101", "C1")];

        let table = aggregate(&conversions, &metrics).unwrap();
        let rows = format(&table);

        assert_eq!(
            rows,
            vec![OutputRow {
                date: "20240101".to_string(),
                campaign_name: "C1".to_string(),
                get_estimate: 2,
                whatsapp_button_click: 0,
                begin_booking: 0,
                submit_booking: 0,
                clicks: 10,
                conversions: 1.0,
                impressions: 100,
                ctr: 1.0,
                avg_cpc: 0.5,
                cost: 5.0,
            }]
        );
        assert_eq!(
            rows[0].cells(),
            ["20240101", "C1", "2", "0", "0", "0", "10", "1", "100", "1", "0.5", "5"]
                .map(String::from)
        );
    }

    #[test]
    fn test_rows_sorted_by_date_then_campaign() {
        let metrics = vec![
            metric("20240102", "Alpha"),
            metric("20240101", "Zulu"),
            metric("20240101", "Bravo"),
            metric("20240103", "Alpha"),
            metric("20240102", "Alpha Two"),
        ];

        let table = aggregate(&Vec::<ConversionEvent>::new(), &metrics).unwrap();
        let rows = format(&table);
        let keys: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.date.as_str(), r.campaign_name.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("20240101", "Bravo"),
                ("20240101", "Zulu"),
                ("20240102", "Alpha"),
                ("20240102", "Alpha Two"),
                ("20240103", "Alpha"),
            ]
        );
        for pair in rows.windows(2) {
            assert!(
                pair[0].date < pair[1].date
                    || (pair[0].date == pair[1].date
                        && pair[0].campaign_name <= pair[1].campaign_name)
            );
        }
    }

    #[test]
    fn test_format_is_repeatable() {
        let conversions = vec![
            ConversionEvent::new("20240101", "B", "BeginBooking"),
            ConversionEvent::new("20240101", "A", "WhatsappButtonClick"),
        ];
        let metrics = vec![metric("20240102", "A"), metric("20240101", "C")];

        let table = aggregate(&conversions, &metrics).unwrap();
        assert_eq!(format(&table), format(&table));
        assert_eq!(format(&table).len(), table.len());
    }

    #[test]
    fn test_empty_table_formats_to_no_rows() {
        let table = AccumulatorTable::new();
        assert!(format(&table).is_empty());
    }

    #[test]
    fn test_header_matches_category_columns() {
        for category in ConversionCategory::all() {
            assert_eq!(OUTPUT_HEADER[2 + category.column_index()], category.column_header());
        }
    }
}
