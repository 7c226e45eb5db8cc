//! Chart, grid, and stats helpers over declared model metadata.
//!
//! These are read-only views of "all installed models", independent of what
//! is registered on any site: the dashboard uses them for auto-completion
//! (which models can be charted, which fields are numeric) and for the
//! quick-stats summary. Eligibility is decided from declared field types
//! alone; nothing here touches a registry or performs registration.
//!
//! Time-bucketed aggregation for chart series also lives here:
//! [`bucket_ranges`] produces the window list for a [`Frequency`] and
//! [`aggregate_series`] folds stored objects into one value per window.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::autodiscover::AdminApp;

/// Namespace prefix of framework-internal applications, which never appear
/// in chart/grid catalogs.
pub const CONTRIB_PREFIX: &str = "backoffice.contrib";

/// A model eligible for charting: it declares at least one numeric field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartModel {
    /// The model's type name (e.g. "Order").
    pub name: String,
    /// Title-cased display label.
    pub label: String,
    /// The application label.
    pub app: String,
    /// The model key (`"app_label.model_name"`).
    pub key: String,
    /// The numeric field names available for aggregation.
    pub fields: Vec<String>,
    /// The field dating each object, when the model declares one.
    pub date_field: Option<String>,
}

/// A model eligible for grids: any concrete, non-proxy model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridModel {
    /// The model's type name.
    pub name: String,
    /// Title-cased display label.
    pub label: String,
    /// The application label.
    pub app: String,
    /// The model key.
    pub key: String,
    /// All declared field names, usable as grid columns.
    pub fields: Vec<String>,
}

/// A model participating in the quick-stats summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsModel {
    /// The model key.
    pub key: String,
    /// The lowercase model name, used as the stats map key.
    pub name: String,
    /// The revenue-bearing field, if the model declares one.
    pub amount_field: Option<String>,
}

/// Returns every chart-eligible model across the given applications.
///
/// Framework-internal (`backoffice.contrib.*`) applications and
/// abstract/proxy models are skipped; a model qualifies only if it declares
/// at least one numeric field.
pub fn models_for_charts(apps: &[&dyn AdminApp]) -> Vec<ChartModel> {
    let mut result = Vec::new();
    for app in apps {
        if app.name().starts_with(CONTRIB_PREFIX) {
            continue;
        }
        for meta in app.models() {
            if meta.abstract_model || meta.proxy {
                continue;
            }
            let numeric: Vec<String> = meta
                .numeric_field_names()
                .into_iter()
                .map(String::from)
                .collect();
            if numeric.is_empty() {
                continue;
            }
            result.push(ChartModel {
                name: meta.object_name.to_string(),
                label: title_case(&meta.verbose_name),
                app: meta.app_label.to_string(),
                key: meta.key(),
                fields: numeric,
                date_field: meta.date_field().map(String::from),
            });
        }
    }
    result
}

/// Returns every grid-eligible model across the given applications.
pub fn models_for_grids(apps: &[&dyn AdminApp]) -> Vec<GridModel> {
    let mut result = Vec::new();
    for app in apps {
        if app.name().starts_with(CONTRIB_PREFIX) {
            continue;
        }
        for meta in app.models() {
            if meta.abstract_model || meta.proxy {
                continue;
            }
            result.push(GridModel {
                name: meta.object_name.to_string(),
                label: title_case(&meta.verbose_name),
                app: meta.app_label.to_string(),
                key: meta.key(),
                fields: meta.field_names().into_iter().map(String::from).collect(),
            });
        }
    }
    result
}

/// Pre-computed dashboard catalogs, built once at startup and handed to the
/// HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct DashboardCatalog {
    /// Chart-eligible models.
    pub chart_models: Vec<ChartModel>,
    /// Grid-eligible models.
    pub grid_models: Vec<GridModel>,
    /// Models participating in the stats summary.
    pub stats_models: Vec<StatsModel>,
}

impl DashboardCatalog {
    /// Builds the catalogs from the installed applications.
    pub fn build(apps: &[&dyn AdminApp]) -> Self {
        let mut stats_models = Vec::new();
        for app in apps {
            if app.name().starts_with(CONTRIB_PREFIX) {
                continue;
            }
            for meta in app.models() {
                if meta.abstract_model || meta.proxy {
                    continue;
                }
                stats_models.push(StatsModel {
                    key: meta.key(),
                    name: meta.model_name.clone(),
                    amount_field: meta.amount_field().map(String::from),
                });
            }
        }

        Self {
            chart_models: models_for_charts(apps),
            grid_models: models_for_grids(apps),
            stats_models,
        }
    }

    /// Resolves a chart model by bare type name (`"Order"`), lowercase name,
    /// or qualified key (`"sales.order"`).
    pub fn find_chart_model(&self, name: &str) -> Option<&ChartModel> {
        let lower = name.to_lowercase();
        self.chart_models
            .iter()
            .find(|m| m.name == name || m.key == lower || m.key.ends_with(&format!(".{lower}")))
    }

    /// Resolves a grid model, with the same matching rules as
    /// [`find_chart_model`](Self::find_chart_model).
    pub fn find_grid_model(&self, name: &str) -> Option<&GridModel> {
        let lower = name.to_lowercase();
        self.grid_models
            .iter()
            .find(|m| m.name == name || m.key == lower || m.key.ends_with(&format!(".{lower}")))
    }
}

/// How chart buckets are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// Last 30 days, one bucket per day.
    Day,
    /// Last 12 weeks, one bucket per week.
    Week,
    /// Last 12 months, one bucket per month.
    Month,
    /// Last 8 quarters, one bucket per quarter.
    Quarter,
    /// Last 5 years, one bucket per year.
    Year,
}

impl Frequency {
    /// Parses a frequency string, defaulting to monthly for unknown input.
    pub fn parse(s: &str) -> Self {
        match s {
            "day" => Self::Day,
            "week" => Self::Week,
            "quarter" => Self::Quarter,
            "year" => Self::Year,
            _ => Self::Month,
        }
    }

    /// The number of buckets rendered for this frequency.
    pub const fn periods(self) -> usize {
        match self {
            Self::Day => 30,
            Self::Week | Self::Month => 12,
            Self::Quarter => 8,
            Self::Year => 5,
        }
    }
}

/// The aggregation applied within each bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Sum of the field across matching objects.
    Sum,
    /// Mean of the field across matching objects.
    Avg,
    /// Number of matching objects.
    Count,
}

impl Operation {
    /// Parses an operation string; anything unrecognized counts objects.
    pub fn parse(s: &str) -> Self {
        match s {
            "sum" => Self::Sum,
            "avg" => Self::Avg,
            _ => Self::Count,
        }
    }
}

/// One chart bucket: a half-open time window and its display label.
#[derive(Debug, Clone)]
pub struct Bucket {
    /// Inclusive window start.
    pub start: DateTime<Utc>,
    /// Exclusive window end.
    pub end: DateTime<Utc>,
    /// Display label (e.g. "03/2026", "Q2 2026").
    pub label: String,
}

/// Produces the bucket windows for a frequency, oldest first, ending at the
/// window containing `now`.
pub fn bucket_ranges(now: DateTime<Utc>, frequency: Frequency) -> Vec<Bucket> {
    let periods = frequency.periods() as i64;
    let mut buckets = Vec::with_capacity(frequency.periods());

    for i in (0..periods).rev() {
        let bucket = match frequency {
            Frequency::Day => {
                let start = now - Duration::days(i + 1);
                Bucket {
                    start,
                    end: now - Duration::days(i),
                    label: start.format("%d/%m").to_string(),
                }
            }
            Frequency::Week => {
                let start = now - Duration::weeks(i + 1);
                Bucket {
                    start,
                    end: now - Duration::weeks(i),
                    label: format!("W{}", start.iso_week().week()),
                }
            }
            Frequency::Month => {
                let start = month_start(now.year(), i64::from(now.month()) - i);
                let end = month_start(now.year(), i64::from(now.month()) - i + 1);
                Bucket {
                    label: start.format("%m/%Y").to_string(),
                    start,
                    end,
                }
            }
            Frequency::Quarter => {
                let current_quarter = i64::from((now.month() - 1) / 3);
                let start = month_start(now.year(), (current_quarter - i) * 3 + 1);
                let end = month_start(now.year(), (current_quarter - i) * 3 + 4);
                let label = format!("Q{} {}", start.month0() / 3 + 1, start.year());
                Bucket { start, end, label }
            }
            Frequency::Year => {
                let year = i32::try_from(i64::from(now.year()) - i).unwrap_or(now.year());
                Bucket {
                    start: year_start(year),
                    end: year_start(year + 1),
                    label: year.to_string(),
                }
            }
        };
        buckets.push(bucket);
    }

    buckets
}

/// First instant of the month `month` (1-based, may be out of range and is
/// normalized) in `year`.
fn month_start(year: i32, month: i64) -> DateTime<Utc> {
    let mut y = i64::from(year);
    let mut m = month;
    while m < 1 {
        m += 12;
        y -= 1;
    }
    while m > 12 {
        m -= 12;
        y += 1;
    }
    let year = i32::try_from(y).unwrap_or(year);
    let date = NaiveDate::from_ymd_opt(year, u32::try_from(m).unwrap_or(1), 1)
        .unwrap_or(NaiveDate::MIN);
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

fn year_start(year: i32) -> DateTime<Utc> {
    month_start(year, 1)
}

/// Folds stored objects into one aggregated value per bucket.
///
/// When `date_field` is present, only objects whose parseable timestamp
/// falls inside a bucket contribute to it; objects without a parseable
/// timestamp are dropped. Without a date field every object contributes to
/// every bucket, matching how undated models chart as flat lines.
pub fn aggregate_series(
    objects: &[Value],
    date_field: Option<&str>,
    value_field: &str,
    operation: Operation,
    buckets: &[Bucket],
) -> (Vec<String>, Vec<f64>) {
    let mut labels = Vec::with_capacity(buckets.len());
    let mut data = Vec::with_capacity(buckets.len());

    for bucket in buckets {
        let in_bucket: Vec<&Value> = objects
            .iter()
            .filter(|obj| match date_field {
                Some(field) => obj
                    .get(field)
                    .and_then(parse_datetime)
                    .is_some_and(|ts| ts >= bucket.start && ts < bucket.end),
                None => true,
            })
            .collect();

        let value = match operation {
            Operation::Count => in_bucket.len() as f64,
            Operation::Sum => in_bucket
                .iter()
                .filter_map(|obj| numeric_value(obj, value_field))
                .sum(),
            Operation::Avg => {
                let values: Vec<f64> = in_bucket
                    .iter()
                    .filter_map(|obj| numeric_value(obj, value_field))
                    .collect();
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
        };

        labels.push(bucket.label.clone());
        data.push(value);
    }

    (labels, data)
}

/// Reads a field as `f64`, accepting JSON numbers and numeric strings.
fn numeric_value(object: &Value, field: &str) -> Option<f64> {
    match object.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

/// Parses a stored timestamp: RFC 3339, `"%Y-%m-%d %H:%M:%S"`, or a bare
/// date.
fn parse_datetime(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
