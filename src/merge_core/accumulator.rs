//! Keyed accumulation of conversion counts and performance metrics

use super::category::ConversionCategory;
use super::records::{ConversionEvent, MetricRow, ParsedMetrics};
use std::collections::{HashMap, HashSet};

/// Composite (date, campaign) key. Fields are compared as-is, never joined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MergeKey {
    pub date: String,
    pub campaign_name: String,
}

impl MergeKey {
    pub fn new(date: impl Into<String>, campaign_name: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            campaign_name: campaign_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub date: String,
    pub campaign_name: String,
    pub conversions_by_category: [u64; ConversionCategory::COUNT],
    pub metrics: ParsedMetrics,
}

impl MergedRecord {
    pub fn new(key: &MergeKey) -> Self {
        Self {
            date: key.date.clone(),
            campaign_name: key.campaign_name.clone(),
            conversions_by_category: [0; ConversionCategory::COUNT],
            metrics: ParsedMetrics::default(),
        }
    }

    pub fn record_conversion(&mut self, category: ConversionCategory) {
        self.conversions_by_category[category.column_index()] += 1;
    }

    pub fn conversion_count(&self, category: ConversionCategory) -> u64 {
        self.conversions_by_category[category.column_index()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub conversion_rows: usize,
    pub metric_rows: usize,
    pub unknown_category_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeError {
    /// A metric row carried text that does not coerce to its numeric type.
    /// `row` is the zero-based position within the metric stream.
    MalformedMetric {
        row: usize,
        date: String,
        campaign_name: String,
        field: &'static str,
        value: String,
    },
    /// Summing a metric row pushed a running total out of range
    MetricOverflow {
        row: usize,
        date: String,
        campaign_name: String,
        field: &'static str,
    },
}

impl std::fmt::Display for MergeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeError::MalformedMetric {
                row,
                date,
                campaign_name,
                field,
                value,
            } => write!(
                f,
                "Malformed metric in row {} ({} / {}): {} = {:?}",
                row, date, campaign_name, field, value
            ),
            MergeError::MetricOverflow {
                row,
                date,
                campaign_name,
                field,
            } => write!(
                f,
                "Metric total overflow in row {} ({} / {}): {}",
                row, date, campaign_name, field
            ),
        }
    }
}

impl std::error::Error for MergeError {}

/// All merged records of a single run, one per (date, campaign) key
#[derive(Debug, Default)]
pub struct AccumulatorTable {
    records: HashMap<MergeKey, MergedRecord>,
    stats: MergeStats,
    unknown_labels: HashSet<String>,
}

impl AccumulatorTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, key: MergeKey) -> &mut MergedRecord {
        self.records
            .entry(key)
            .or_insert_with_key(MergedRecord::new)
    }

    /// Count one conversion. Unknown categories still register the key but
    /// touch no counter.
    pub fn add_conversion(&mut self, event: &ConversionEvent) {
        self.stats.conversion_rows += 1;
        let key = MergeKey::new(event.date.as_str(), event.campaign_name.as_str());
        match ConversionCategory::from_tag(&event.category) {
            Some(category) => self.entry(key).record_conversion(category),
            None => {
                self.entry(key);
                self.stats.unknown_category_rows += 1;
                if self.unknown_labels.insert(event.category.clone()) {
                    log::warn!(
                        "⚠️  Unknown conversion category {:?} ({} / {}), not counted",
                        event.category,
                        event.date,
                        event.campaign_name
                    );
                }
            }
        }
    }

    /// Add one metric row. `index` is its position in the metric stream and
    /// only feeds the error.
    pub fn add_metrics(&mut self, index: usize, row: &MetricRow) -> Result<(), MergeError> {
        let parsed = ParsedMetrics::from_row(row).map_err(|e| MergeError::MalformedMetric {
            row: index,
            date: row.date.clone(),
            campaign_name: row.campaign_name.clone(),
            field: e.field,
            value: e.value,
        })?;

        let key = MergeKey::new(row.date.as_str(), row.campaign_name.as_str());
        self.entry(key)
            .metrics
            .accumulate(&parsed)
            .map_err(|e| MergeError::MetricOverflow {
                row: index,
                date: row.date.clone(),
                campaign_name: row.campaign_name.clone(),
                field: e.field,
            })?;
        self.stats.metric_rows += 1;
        Ok(())
    }

    pub fn get(&self, key: &MergeKey) -> Option<&MergedRecord> {
        self.records.get(key)
    }

    pub fn records(&self) -> impl Iterator<Item = &MergedRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }
}

/// Merge both report streams into one table.
///
/// Conversions only ever bump category counters and metric rows only ever
/// add to the numeric totals. The first malformed metric aborts the merge.
pub fn aggregate<'a, A, B>(conversions: A, metrics: B) -> Result<AccumulatorTable, MergeError>
where
    A: IntoIterator<Item = &'a ConversionEvent>,
    B: IntoIterator<Item = &'a MetricRow>,
{
    let mut table = AccumulatorTable::new();

    for event in conversions {
        table.add_conversion(event);
    }

    for (index, row) in metrics.into_iter().enumerate() {
        table.add_metrics(index, row)?;
    }

    log::debug!(
        "Merged {} conversion rows and {} metric rows into {} keys",
        table.stats.conversion_rows,
        table.stats.metric_rows,
        table.len()
    );

    Ok(table)
}
