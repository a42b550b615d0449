//! Carelog - Analytics engine for time-stamped child-care activity logs
//!
//! Carelog computes descriptive statistics and rule-based anomaly flags over
//! sleep, feeding, and diaper-change events for a single subject, through a
//! deterministic pipeline: source fetch → normalization → window selection →
//! analysis.
//!
//! ## Modules
//!
//! - **Sleep**: session summaries, quality distribution, duration-jump and
//!   missed-nap anomaly detection
//! - **Feed**: volume, interval, time-of-day, consistency, and type-ratio
//!   analyzers over milliliter-extracted feed events
//! - **Diaper**: frequency, content-type, timing, interval, and alert
//!   analyzers over diaper changes

pub mod diaper;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod feed;
pub mod normalizer;
pub mod sleep;
pub mod source;
pub mod stats;
pub mod types;
pub mod window;

pub use dispatch::{AnalysisReport, MetricFamily, Report};
pub use engine::{AnalysisConfig, Engine};
pub use error::{AnalyticsError, SourceError};
pub use normalizer::Normalizer;
pub use source::{ActivitySource, InMemorySource};
pub use types::{ActivityType, DataStatus, RawActivityRecord, SubjectId};
pub use window::{select_window, WindowOutcome};

/// Carelog version embedded in all report metadata
pub const CARELOG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report metadata
pub const PRODUCER_NAME: &str = "carelog";
