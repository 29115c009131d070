//! Static tax reference data: the marginal rate schedule and the relief
//! base-amount table.

pub mod rates;
pub mod reliefs;

pub use rates::{RateSchedule, rate_for};
pub use reliefs::{Relief, ReliefBase, estimate_saving, lookup};

/// Upper bound on any single suggestion, as a share of income.
pub const MAX_SAVING_SHARE: f64 = 0.3;

/// Share of income used as the minimal estimate for unknown categories.
pub const MIN_SAVING_SHARE: f64 = 0.01;
