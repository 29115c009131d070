//! Advisor interface: the LLM client the pipeline sends its prompt to.
//!
//! ```text
//! generate_plan(advisor, request)
//!     |
//!     v
//! &dyn Advisor --complete(prompt)--> raw text | AdvisorError
//!     |
//!     +-- CommandAdvisor  (`claude -p`, prompt on stdin)
//!     +-- FileAdvisor     (canned response file)
//! ```

pub mod command;
pub mod file;
pub mod trait_def;

pub use command::CommandAdvisor;
pub use file::FileAdvisor;
pub use trait_def::{Advisor, AdvisorError};
