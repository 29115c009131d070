//! Plan-synthesis pipeline: turns free-text LLM tax advice into validated
//! saving plans.
//!
//! ```text
//! PlanRequest --build_prompt--> Advisor::complete --> raw text
//!     raw text --extract--> candidates --repair (may fall back)--> assemble --> TaxPlan
//! ```

pub mod advisor;
pub mod assemble;
pub mod extract;
pub mod fallback;
pub mod pipeline;
pub mod prompt;
pub mod repair;
pub mod request;
pub mod service;
pub mod store;
pub mod tax;

pub use assemble::TaxPlan;
pub use extract::Candidate;
pub use pipeline::{PlanError, generate_plan, synthesize_plan};
pub use request::PlanRequest;
