//! Loader for the HTTP testing backend.
//!
//! Endpoints:
//! - `GET {base}/api/tests`
//! - `GET {base}/api/tests/{id}`
//! - `GET {base}/api/tests/{id}/questions`

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use assessor_core::error::LoadError;
use assessor_core::model::{
    AnswerOption, Question, QuestionId, TestDefinition, TestId, TestSummary,
};
use assessor_core::traits::QuestionSetLoader;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Loader that fetches tests from the testing backend's REST API.
pub struct HttpLoader {
    base_url: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

impl HttpLoader {
    pub fn new(base_url: &str, api_token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client,
        })
    }

    /// Active tests in the backend's catalogue.
    #[instrument(skip(self))]
    pub async fn list_tests(&self) -> Result<Vec<TestSummary>, LoadError> {
        let api: ApiTestList = self.get_json("/api/tests", None).await?;
        tracing::debug!(count = api.tests.len(), "fetched test list");

        api.tests
            .into_iter()
            .map(|t| {
                let question_count = t.questions_count.unwrap_or(0);
                Ok(TestSummary {
                    test: t.into_definition()?,
                    question_count,
                })
            })
            .collect()
    }

    /// `GET` a JSON body. A 404 means the test `id` does not exist.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        id: Option<TestId>,
    ) -> Result<T, LoadError> {
        let mut request = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::Transport(format!("request timed out after {DEFAULT_TIMEOUT_SECS}s"))
            } else {
                LoadError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if let (404, Some(id)) = (status, id) {
            return Err(LoadError::test_not_found(id));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(LoadError::Transport(format!("HTTP {status}: {body}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| LoadError::Malformed(format!("failed to parse response: {e}")))
    }
}

#[derive(Deserialize)]
struct ApiTest {
    id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    time_limit: Option<u32>,
    passing_score: f64,
    #[serde(default)]
    questions_count: Option<usize>,
}

impl ApiTest {
    fn into_definition(self) -> Result<TestDefinition, LoadError> {
        Ok(TestDefinition {
            id: TestId::new(self.id),
            title: self.title,
            description: self.description.unwrap_or_default(),
            time_limit_minutes: self.time_limit,
            passing_score: passing_score_percent(self.passing_score)?,
        })
    }
}

#[derive(Deserialize)]
struct ApiTestList {
    #[serde(default)]
    tests: Vec<ApiTest>,
}

#[derive(Deserialize)]
struct ApiQuestions {
    #[serde(default)]
    questions: Vec<ApiQuestion>,
}

#[derive(Deserialize)]
struct ApiQuestion {
    id: u64,
    question: String,
    #[serde(default)]
    answers: Vec<ApiAnswer>,
    #[serde(default)]
    points: Option<f64>,
    #[serde(default)]
    order: Option<i64>,
}

#[derive(Deserialize)]
struct ApiAnswer {
    text: String,
    /// `null` when the backend hides correct answers.
    #[serde(default)]
    is_correct: Option<bool>,
    #[serde(default)]
    order: Option<i64>,
}

/// Scores are whole percentages, so `score >= ceil(p)` iff `score >= p`.
fn passing_score_percent(p: f64) -> Result<u8, LoadError> {
    if !p.is_finite() || !(0.0..=255.0).contains(&p) {
        return Err(LoadError::Malformed(format!("invalid passing score: {p}")));
    }
    Ok(p.ceil() as u8)
}

#[async_trait]
impl QuestionSetLoader for HttpLoader {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(test_id = %id))]
    async fn test_definition(&self, id: TestId) -> Result<TestDefinition, LoadError> {
        let api: ApiTest = self.get_json(&format!("/api/tests/{id}"), Some(id)).await?;
        tracing::debug!(title = %api.title, "fetched test");
        api.into_definition()
    }

    #[instrument(skip(self), fields(test_id = %id))]
    async fn questions(&self, id: TestId) -> Result<Vec<Question>, LoadError> {
        let api: ApiQuestions = self
            .get_json(&format!("/api/tests/{id}/questions"), Some(id))
            .await?;
        tracing::debug!(count = api.questions.len(), "fetched questions");

        // Every flag is null when the backend withholds correct answers.
        let hidden = api
            .questions
            .iter()
            .flat_map(|q| &q.answers)
            .all(|a| a.is_correct.is_none());
        if hidden && api.questions.iter().any(|q| !q.answers.is_empty()) {
            return Err(LoadError::Malformed(
                "backend hides correct answers".to_string(),
            ));
        }

        let mut questions = api.questions;
        questions.sort_by_key(|q| q.order.unwrap_or(i64::MAX));

        Ok(questions
            .into_iter()
            .map(|q| {
                let mut answers = q.answers;
                answers.sort_by_key(|a| a.order.unwrap_or(i64::MAX));
                Question {
                    id: QuestionId::new(q.id),
                    prompt: q.question,
                    options: answers
                        .into_iter()
                        .map(|a| AnswerOption::new(a.text, a.is_correct.unwrap_or(false)))
                        .collect(),
                    points: q.points.map(|p| p.round().max(0.0) as u32).unwrap_or(1),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_test(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/api/tests/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn fetches_test_definition() {
        let server = MockServer::start().await;
        mount_test(
            &server,
            serde_json::json!({
                "id": 3,
                "title": "Chemistry",
                "description": null,
                "time_limit": 15,
                "passing_score": 70.0,
                "questions_count": 2
            }),
        )
        .await;

        let loader = HttpLoader::new(&server.uri(), None).unwrap();
        let test = loader.test_definition(TestId::new(3)).await.unwrap();
        assert_eq!(test.title, "Chemistry");
        assert_eq!(test.time_limit_minutes, Some(15));
        assert_eq!(test.passing_score, 70);
        assert!(test.description.is_empty());
    }

    #[tokio::test]
    async fn fractional_passing_score_rounds_up() {
        let server = MockServer::start().await;
        mount_test(
            &server,
            serde_json::json!({"id": 3, "title": "T", "time_limit": null, "passing_score": 66.5}),
        )
        .await;

        let loader = HttpLoader::new(&server.uri(), None).unwrap();
        let test = loader.test_definition(TestId::new(3)).await.unwrap();
        assert_eq!(test.passing_score, 67);
        assert_eq!(test.time_limit_minutes, None);
    }

    #[tokio::test]
    async fn questions_are_ordered() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "test_id": 3,
            "questions": [
                {
                    "id": 20, "question": "Second", "order": 2, "points": 1.0,
                    "answers": [
                        {"id": 1, "text": "b", "is_correct": false, "order": 2},
                        {"id": 2, "text": "a", "is_correct": true, "order": 1}
                    ]
                },
                {
                    "id": 10, "question": "First", "order": 1, "points": 2.0,
                    "answers": [
                        {"id": 3, "text": "x", "is_correct": null, "order": 1}
                    ]
                }
            ],
            "total_questions": 2
        });
        Mock::given(method("GET"))
            .and(path("/api/tests/3/questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let loader = HttpLoader::new(&server.uri(), None).unwrap();
        let questions = loader.questions(TestId::new(3)).await.unwrap();
        assert_eq!(questions[0].id, QuestionId::new(10));
        assert_eq!(questions[0].points, 2);
        assert!(!questions[0].options[0].is_correct);
        assert_eq!(questions[1].options[0].text, "a");
        assert_eq!(questions[1].correct_index(), Some(0));
    }

    #[tokio::test]
    async fn missing_test_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tests/3"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"detail": "Test not found"})),
            )
            .mount(&server)
            .await;

        let loader = HttpLoader::new(&server.uri(), None).unwrap();
        let err = loader.test_definition(TestId::new(3)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn server_error_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tests/3/questions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let loader = HttpLoader::new(&server.uri(), None).unwrap();
        let err = loader.questions(TestId::new(3)).await.unwrap_err();
        assert_eq!(err, LoadError::Transport("HTTP 500: boom".into()));
    }

    #[tokio::test]
    async fn sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tests/3"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 3, "title": "T", "time_limit": 1, "passing_score": 50
            })))
            .mount(&server)
            .await;

        let loader = HttpLoader::new(&format!("{}/", server.uri()), Some("secret".into())).unwrap();
        assert!(loader.test_definition(TestId::new(3)).await.is_ok());
    }

    #[tokio::test]
    async fn hidden_correct_answers_are_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tests/3/questions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "questions": [
                    {
                        "id": 1, "question": "Q", "order": 1,
                        "answers": [
                            {"text": "a", "is_correct": null, "order": 1},
                            {"text": "b", "is_correct": null, "order": 2}
                        ]
                    }
                ]
            })))
            .mount(&server)
            .await;

        let loader = HttpLoader::new(&server.uri(), None).unwrap();
        let err = loader.questions(TestId::new(3)).await.unwrap_err();
        assert_eq!(
            err,
            LoadError::Malformed("backend hides correct answers".into())
        );
    }

    #[tokio::test]
    async fn lists_tests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tests"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "tests": [
                    {
                        "id": 2, "title": "Physics", "description": "d",
                        "time_limit": 10, "passing_score": 60.0,
                        "questions_count": 4, "created_at": "2024-01-01T00:00:00"
                    },
                    {
                        "id": 1, "title": "Untimed", "description": null,
                        "time_limit": null, "passing_score": 50.5,
                        "questions_count": 1, "created_at": "2023-12-01T00:00:00"
                    }
                ],
                "total": 2, "limit": 100, "offset": 0
            })))
            .mount(&server)
            .await;

        let loader = HttpLoader::new(&server.uri(), None).unwrap();
        let tests = loader.list_tests().await.unwrap();
        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].test.title, "Physics");
        assert_eq!(tests[0].question_count, 4);
        assert_eq!(tests[1].test.passing_score, 51);
        assert_eq!(tests[1].test.time_limit_minutes, None);
    }

    #[tokio::test]
    async fn missing_catalogue_is_transport() {
        let server = MockServer::start().await;
        let loader = HttpLoader::new(&server.uri(), None).unwrap();
        let err = loader.list_tests().await.unwrap_err();
        assert!(matches!(err, LoadError::Transport(msg) if msg.starts_with("HTTP 404")));
    }

    #[test]
    fn passing_score_bounds() {
        assert_eq!(passing_score_percent(0.0).unwrap(), 0);
        assert_eq!(passing_score_percent(100.0).unwrap(), 100);
        assert!(passing_score_percent(-1.0).is_err());
        assert!(passing_score_percent(f64::NAN).is_err());
    }
}
