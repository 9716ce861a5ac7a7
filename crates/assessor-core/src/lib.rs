//! assessor-core — Timed assessment session engine and scoring.
//!
//! This crate defines the data model, the in-progress attempt state machine
//! with its clock, cursor and answer ledger, the scorer, and the loader trait
//! that the rest of assessor builds on.

pub mod clock;
pub mod cursor;
pub mod error;
pub mod ledger;
pub mod model;
pub mod parser;
pub mod report;
pub mod scorer;
pub mod session;
pub mod traits;

pub use error::{LoadError, SessionError, ValidationError};
pub use model::{AnswerOption, Question, QuestionId, TestDefinition, TestId, TestSummary};
pub use scorer::AttemptResult;
pub use session::{Attempt, Phase};
