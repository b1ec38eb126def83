pub mod calendar;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod format;
pub mod payments;
pub mod serialization;
pub mod types;

// re-export key types
pub use config::{EmiRounding, EngineConfig};
pub use decimal::{Money, Rate};
pub use engine::AmortizationEngine;
pub use errors::{EngineError, Result};
pub use payments::{
    build_schedule, compute_emi, evaluate, solve_tenure, AmortizationRow, AmortizationSchedule,
    EngineResult, PrepaymentOutcome, ScheduleComparison,
};
pub use serialization::ResultView;
pub use types::{
    LoanTerms, PrepaymentEvent, PrepaymentId, SkipReason, SkippedPrepayment, Tenure,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
