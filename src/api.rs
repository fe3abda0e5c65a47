//! Public API surface for the data-preparation backend.
//!
//! This file consolidates the DTO types exchanged with consumers of the
//! pipeline (model-training jobs, quality-report endpoints). All types derive
//! Serialize/Deserialize for JSON serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The four independently-sampled sensor streams the pipeline reconciles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Solar generation power, watts.
    Solar,
    /// Household load power, watts.
    Load,
    /// Energy price, cents after normalization.
    Price,
    /// Battery state of charge, percent.
    Battery,
}

impl SignalKind {
    /// All signal kinds, in the order the Loader queries them.
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Solar,
        SignalKind::Load,
        SignalKind::Price,
        SignalKind::Battery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Solar => "solar",
            SignalKind::Load => "load",
            SignalKind::Price => "price",
            SignalKind::Battery => "battery",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Categorical price level attached to price samples by the upstream tariff
/// source. Defaults to `Normal` when the store row carries no level.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceLevel {
    VeryCheap,
    Cheap,
    #[default]
    Normal,
    Expensive,
    VeryExpensive,
}

/// One raw measurement as produced by the Loader from a store query row.
///
/// Values are already normalized: power fields are floored at 0, battery
/// state of charge is clamped to [0, 100] and prices are rescaled to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub kind: SignalKind,
    /// Present only on price samples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<PriceLevel>,
}

/// The scalar fields of an aligned record that are subject to gap filling,
/// outlier filtering and statistics.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarField {
    Solar,
    Load,
    Price,
    BatterySoc,
}

impl ScalarField {
    pub const ALL: [ScalarField; 4] = [
        ScalarField::Solar,
        ScalarField::Load,
        ScalarField::Price,
        ScalarField::BatterySoc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarField::Solar => "solar",
            ScalarField::Load => "load",
            ScalarField::Price => "price",
            ScalarField::BatterySoc => "battery_soc",
        }
    }

    /// Fixed fill value applied when a field has no observed samples at all.
    ///
    /// These are policy constants carried over from the original deployment
    /// (baseline household load of 500 W, baseline price of 10 cents, half
    /// charge), not derived quantities. They bias statistics on sparse
    /// inputs; keep them in sync with consumers.
    pub fn fill_default(&self) -> f64 {
        match self {
            ScalarField::Solar => 0.0,
            ScalarField::Load => 500.0,
            ScalarField::Price => 10.0,
            ScalarField::BatterySoc => 50.0,
        }
    }
}

impl std::fmt::Display for ScalarField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Four-way season label derived from the month.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

/// Calendar and cyclical features derived from a slot's timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeFeatures {
    pub hour: u32,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u32,
    pub day_of_month: u32,
    pub month: u32,
    pub day_of_year: u32,
    pub is_weekend: bool,
    pub season: Season,
    pub hour_sin: f64,
    pub hour_cos: f64,
    pub day_of_year_sin: f64,
    pub day_of_year_cos: f64,
}

/// One hourly slot of the aligned timeline.
///
/// Scalar fields may be `None` between alignment and gap filling; after gap
/// filling every scalar is guaranteed to be `Some` and finite. `features` is
/// populated by the feature extraction stage only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    pub timestamp: DateTime<Utc>,
    pub solar: Option<f64>,
    pub load: Option<f64>,
    pub price: Option<f64>,
    pub price_level: Option<PriceLevel>,
    pub battery_soc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<TimeFeatures>,
}

impl AlignedRecord {
    /// Create an empty slot at the given timestamp.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            solar: None,
            load: None,
            price: None,
            price_level: None,
            battery_soc: None,
            features: None,
        }
    }

    pub fn get(&self, field: ScalarField) -> Option<f64> {
        match field {
            ScalarField::Solar => self.solar,
            ScalarField::Load => self.load,
            ScalarField::Price => self.price,
            ScalarField::BatterySoc => self.battery_soc,
        }
    }

    pub fn set(&mut self, field: ScalarField, value: Option<f64>) {
        match field {
            ScalarField::Solar => self.solar = value,
            ScalarField::Load => self.load = value,
            ScalarField::Price => self.price = value,
            ScalarField::BatterySoc => self.battery_soc = value,
        }
    }
}

/// The hourly span covered by an aligned dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Number of hourly slots between `start` and `end`, inclusive.
    pub hours: usize,
}

/// Descriptive statistics over the non-null values of one scalar field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldStatistics {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
    pub median: f64,
    pub percentile25: f64,
    pub percentile75: f64,
}

/// Pearson correlation coefficient for one unordered field pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub field1: String,
    pub field2: String,
    pub correlation: f64,
}

/// Heuristic data-quality summary for a prepared dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// 0..=100; penalized for incompleteness, low volume and staleness.
    pub score: f64,
    pub issues: Vec<String>,
    pub total_points: usize,
    /// Human-readable span, e.g. "14.0 days".
    pub time_span: String,
}

/// Aggregated statistics block attached to every dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStatistics {
    pub solar: FieldStatistics,
    pub load: FieldStatistics,
    pub price: FieldStatistics,
    pub battery_soc: FieldStatistics,
    pub correlations: Vec<CorrelationEntry>,
    pub quality: QualityReport,
}

impl DatasetStatistics {
    pub fn field(&self, field: ScalarField) -> &FieldStatistics {
        match field {
            ScalarField::Solar => &self.solar,
            ScalarField::Load => &self.load,
            ScalarField::Price => &self.price,
            ScalarField::BatterySoc => &self.battery_soc,
        }
    }
}

/// Terminal artifact of the preparation pipeline.
///
/// Constructed fresh per pipeline run; cached instances are owned exclusively
/// by the result cache and released on TTL expiry or explicit invalidation.
/// Consumers must treat a dataset as read-only and re-request rather than
/// patch in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub solar: Vec<RawSample>,
    pub load: Vec<RawSample>,
    pub prices: Vec<RawSample>,
    pub battery: Vec<RawSample>,
    pub aligned: Vec<AlignedRecord>,
    pub statistics: DatasetStatistics,
    pub time_range: TimeRange,
}
