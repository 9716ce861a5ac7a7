//! Loader backed by TOML test files on disk.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use assessor_core::error::LoadError;
use assessor_core::model::{Question, TestDefinition, TestId, TestSummary};
use assessor_core::parser::{self, TestFile};
use assessor_core::traits::QuestionSetLoader;

/// Serves tests parsed from a TOML file or a directory of them.
///
/// Files are read once, when the loader is opened.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    tests: BTreeMap<TestId, TestFile>,
}

impl FileLoader {
    /// Load a single `.toml` file or every `.toml` file under a directory.
    pub fn open(path: &Path) -> Result<Self> {
        let files = if path.is_dir() {
            parser::load_test_directory(path)?
        } else {
            vec![parser::parse_test_file(path)?]
        };
        tracing::debug!(path = %path.display(), count = files.len(), "loaded test files");
        Ok(Self::from_files(files))
    }

    /// Build a loader from already parsed files. Later duplicates of a test
    /// id are ignored.
    pub fn from_files(files: Vec<TestFile>) -> Self {
        let mut tests = BTreeMap::new();
        for file in files {
            let id = file.test.id;
            if tests.contains_key(&id) {
                tracing::warn!("duplicate test id {id} ({}), skipping", file.test.title);
                continue;
            }
            tests.insert(id, file);
        }
        Self { tests }
    }

    /// All loaded tests, ordered by id.
    pub fn tests(&self) -> impl Iterator<Item = &TestFile> {
        self.tests.values()
    }

    pub fn summaries(&self) -> Vec<TestSummary> {
        self.tests()
            .map(|file| TestSummary {
                test: file.test.clone(),
                question_count: file.questions.len(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    fn get(&self, id: TestId) -> Result<&TestFile, LoadError> {
        self.tests.get(&id).ok_or_else(|| LoadError::test_not_found(id))
    }
}

#[async_trait]
impl QuestionSetLoader for FileLoader {
    fn name(&self) -> &str {
        "files"
    }

    async fn test_definition(&self, id: TestId) -> Result<TestDefinition, LoadError> {
        Ok(self.get(id)?.test.clone())
    }

    async fn questions(&self, id: TestId) -> Result<Vec<Question>, LoadError> {
        Ok(self.get(id)?.questions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAFETY: &str = r#"
[test]
id = 7
title = "Safety"
time_limit_minutes = 5

[[questions]]
id = 1
prompt = "Exit?"
options = [{ text = "Door", correct = true }, { text = "Window" }]
"#;

    const DUPLICATE: &str = r#"
[test]
id = 7
title = "Safety copy"

[[questions]]
id = 1
prompt = "Exit?"
options = [{ text = "Door", correct = true }]
"#;

    #[tokio::test]
    async fn serves_tests_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), SAFETY).unwrap();
        std::fs::write(dir.path().join("b.toml"), DUPLICATE).unwrap();

        let loader = FileLoader::open(dir.path()).unwrap();
        assert_eq!(loader.len(), 1);
        let summaries = loader.summaries();
        assert_eq!(summaries[0].test.title, "Safety");
        assert_eq!(summaries[0].question_count, 1);

        let (test, questions) = loader.load(TestId::new(7)).await.unwrap();
        assert_eq!(test.title, "Safety");
        assert_eq!(questions.len(), 1);
    }

    #[tokio::test]
    async fn single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("safety.toml");
        std::fs::write(&path, SAFETY).unwrap();

        let loader = FileLoader::open(&path).unwrap();
        let test = loader.test_definition(TestId::new(7)).await.unwrap();
        assert_eq!(test.time_limit_minutes, Some(5));
    }

    #[tokio::test]
    async fn unknown_test_is_not_found() {
        let loader = FileLoader::default();
        let err = loader.questions(TestId::new(1)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_file_fails_to_open() {
        assert!(FileLoader::open(Path::new("does-not-exist.toml")).is_err());
    }
}
