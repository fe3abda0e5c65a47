//! # HEMS Rust Backend
//!
//! Historical time-series preparation engine for the Home Energy Management
//! System (HEMS).
//!
//! This crate reconciles four differently-sampled, unreliable sensor streams
//! (solar generation, household load, energy price, battery state of charge)
//! into a single time-aligned, gap-free, feature-enriched hourly dataset
//! suitable for statistical modeling or ML training, together with quality
//! metrics downstream consumers can trust.
//!
//! ## Features
//!
//! - **Loading**: Per-kind store queries with partial-failure tolerance
//! - **Alignment**: Uniform hourly timeline via nearest-match assignment
//! - **Repair**: Gap filling by interpolation with fill fallbacks
//! - **Cleaning**: 3-sigma outlier neutralization and power-field smoothing
//! - **Features**: Calendar and cyclical encodings per slot
//! - **Quality**: Descriptive statistics, correlations and a 0-100 score
//! - **Caching**: TTL-bounded memoization per lookback window
//!
//! ## Architecture
//!
//! The crate is organized into three logical modules:
//!
//! - [`api`]: DTO types consumed by training jobs and report endpoints
//! - [`store`]: Abstract query interface over the external time-series store
//! - [`pipeline`]: The preparation stages and the [`pipeline::HistoricalDataService`] façade
//!
//! Model training, periodic collection scheduling, persistent caching and
//! the HTTP surface are out of scope and live with other services.

pub mod api;
pub mod pipeline;
pub mod store;

pub use pipeline::HistoricalDataService;
