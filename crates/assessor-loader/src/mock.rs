//! In-memory loader for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use assessor_core::error::LoadError;
use assessor_core::model::{Question, TestDefinition, TestId};
use assessor_core::traits::QuestionSetLoader;

/// How the mock answers a request.
#[derive(Debug, Clone)]
enum Behavior {
    Serve,
    Fail(LoadError),
    /// Never resolves; the attempt stays loading.
    Hang,
}

/// A loader that serves tests from memory, for exercising the runtime
/// without files or a backend.
pub struct MockLoader {
    tests: HashMap<TestId, (TestDefinition, Vec<Question>)>,
    behavior: Behavior,
    delay: Option<Duration>,
    /// Number of `test_definition` and `questions` calls made.
    call_count: AtomicU32,
    last_requested: Mutex<Option<TestId>>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self {
            tests: HashMap::new(),
            behavior: Behavior::Serve,
            delay: None,
            call_count: AtomicU32::new(0),
            last_requested: Mutex::new(None),
        }
    }

    /// Create a mock serving a single test.
    pub fn with_test(test: TestDefinition, questions: Vec<Question>) -> Self {
        let mut mock = Self::new();
        mock.insert(test, questions);
        mock
    }

    /// Create a mock whose every request fails with `error`.
    pub fn failing(error: LoadError) -> Self {
        Self {
            behavior: Behavior::Fail(error),
            ..Self::new()
        }
    }

    /// Create a mock whose requests never complete.
    pub fn hanging() -> Self {
        Self {
            behavior: Behavior::Hang,
            ..Self::new()
        }
    }

    pub fn insert(&mut self, test: TestDefinition, questions: Vec<Question>) {
        self.tests.insert(test.id, (test, questions));
    }

    /// Delay every response by `delay` (uses tokio time, so paused-clock
    /// tests stay deterministic).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_requested(&self) -> Option<TestId> {
        *self
            .last_requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn lookup(&self, id: TestId) -> Result<&(TestDefinition, Vec<Question>), LoadError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_requested
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(id);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            Behavior::Serve => self.tests.get(&id).ok_or_else(|| LoadError::test_not_found(id)),
            Behavior::Fail(error) => Err(error.clone()),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

impl Default for MockLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionSetLoader for MockLoader {
    fn name(&self) -> &str {
        "mock"
    }

    async fn test_definition(&self, id: TestId) -> Result<TestDefinition, LoadError> {
        Ok(self.lookup(id).await?.0.clone())
    }

    async fn questions(&self, id: TestId) -> Result<Vec<Question>, LoadError> {
        Ok(self.lookup(id).await?.1.clone())
    }
}
