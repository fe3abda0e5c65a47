//! Time-series store access layer.
//!
//! This module abstracts the external time-series storage engine behind the
//! [`MeasurementStore`] trait so the pipeline can be exercised against an
//! in-memory backend and swapped onto the production store without code
//! changes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Pipeline (loader, aligner, ... , statistics)            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  MeasurementStore trait - abstract query interface       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │              LocalStore (in-memory)           │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! The Loader is the only pipeline component depending on this contract; the
//! store's own persistence, ingestion and timeout behavior are out of scope.

pub mod error;
pub mod local;
pub mod repository;

pub use error::{ErrorContext, StoreError, StoreResult};
pub use local::LocalStore;
pub use repository::{MeasurementRow, MeasurementStore};
