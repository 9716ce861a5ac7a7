//! Loader trait for test definitions and question sets.
//!
//! Implemented by the `assessor-loader` crate (TOML files, HTTP backend,
//! in-memory mock). The engine only ever reads through it.

use async_trait::async_trait;

use crate::error::LoadError;
use crate::model::{Question, TestDefinition, TestId};

/// Source of tests for an attempt.
#[async_trait]
pub trait QuestionSetLoader: Send + Sync {
    /// Human-readable loader name (e.g. "files").
    fn name(&self) -> &str;

    /// Fetch test metadata.
    async fn test_definition(&self, id: TestId) -> Result<TestDefinition, LoadError>;

    /// Fetch the ordered questions of a test.
    async fn questions(&self, id: TestId) -> Result<Vec<Question>, LoadError>;

    /// Fetch both halves concurrently.
    async fn load(&self, id: TestId) -> Result<(TestDefinition, Vec<Question>), LoadError> {
        futures::try_join!(self.test_definition(id), self.questions(id))
    }
}
