//! HTTP implementation of the quiz backend contract.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use wordquiz_core::model::LearnRecord;
use wordquiz_core::{AnswerAttempt, AnswerReceipt, BackendError, Question, QuizBackend};

use crate::error::{from_status, from_transport};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the word-learning backend's REST API.
pub struct HttpBackend {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Successful `POST /api/auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

/// `GET /api/score` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreResponse {
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base.trim_end_matches('/').to_string(),
            timeout_secs: timeout.as_secs(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request, turning transport failures and non-2xx statuses into
    /// [`BackendError`]s.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| from_transport(&e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(from_status(status.as_u16(), &body));
        }
        Ok(response)
    }

    /// Exchange credentials for a session token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, BackendError> {
        let response = self
            .send(
                self.client
                    .post(self.url("/api/auth/login"))
                    .json(&Credentials { username, password }),
            )
            .await?;

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("failed to parse login response: {e}")))
    }

    /// Create an account. Returns the server's confirmation message.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<String, BackendError> {
        let response = self
            .send(
                self.client
                    .post(self.url("/api/auth/register"))
                    .json(&Credentials { username, password }),
            )
            .await?;

        let body = response.text().await.unwrap_or_default();
        Ok(serde_json::from_str::<MessageResponse>(&body)
            .ok()
            .and_then(|m| m.message)
            .unwrap_or_else(|| "Registration successful".to_string()))
    }

    /// The signed-in user's score.
    #[instrument(skip_all)]
    pub async fn score(&self, token: &str) -> Result<ScoreResponse, BackendError> {
        let response = self
            .send(self.client.get(self.url("/api/score")).bearer_auth(token))
            .await?;

        response
            .json::<ScoreResponse>()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("failed to parse score response: {e}")))
    }
}

#[async_trait]
impl QuizBackend for HttpBackend {
    #[instrument(skip_all)]
    async fn fetch_question(&self, token: &str) -> Result<Question, BackendError> {
        let response = self
            .send(
                self.client
                    .get(self.url("/api/multiple-choice"))
                    .bearer_auth(token),
            )
            .await?;

        let question = response.json::<Question>().await.map_err(|e| {
            BackendError::InvalidResponse(format!("failed to parse question: {e}"))
        })?;
        tracing::debug!(question_id = %question.id, options = question.options.len(), "question received");
        Ok(question)
    }

    #[instrument(skip(self, token), fields(question_id = %attempt.question_id, is_correct = attempt.is_correct))]
    async fn record_answer(
        &self,
        token: &str,
        attempt: &AnswerAttempt,
    ) -> Result<AnswerReceipt, BackendError> {
        let response = self
            .send(
                self.client
                    .post(self.url("/api/learn"))
                    .bearer_auth(token)
                    .json(&LearnRecord::from(attempt)),
            )
            .await?;

        // The contract leaves the body unspecified; read what we can.
        let body = response.text().await.unwrap_or_default();
        let receipt = serde_json::from_str::<AnswerReceipt>(&body).unwrap_or_default();
        tracing::debug!(score_change = ?receipt.score_change, "answer recorded");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use wordquiz_core::QuestionId;

    fn backend(server: &MockServer) -> HttpBackend {
        HttpBackend::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn fetch_question_sends_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/multiple-choice"))
            .and(header("Authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 7,
                "question": "chat",
                "options": ["dog", "cat", "bird", "fish"],
                "correct_answer": "cat"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let question = backend(&server).fetch_question("tok-1").await.unwrap();
        assert_eq!(question.id, QuestionId(7));
        assert_eq!(question.prompt, "chat");
        assert_eq!(question.options.len(), 4);
        assert_eq!(question.correct_answer, "cat");
    }

    #[tokio::test]
    async fn fetch_question_unauthorized_carries_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/multiple-choice"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Token has expired",
                "error_type": "TokenExpired"
            })))
            .mount(&server)
            .await;

        let err = backend(&server).fetch_question("old").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.payload_message(), Some("Token has expired"));
    }

    #[tokio::test]
    async fn fetch_question_server_error_without_message() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/multiple-choice"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = backend(&server).fetch_question("t").await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Api {
                status: 502,
                message: None
            }
        );
    }

    #[tokio::test]
    async fn malformed_question_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/multiple-choice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 1})))
            .mount(&server)
            .await;

        let err = backend(&server).fetch_question("t").await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn record_answer_posts_word_id_and_correctness() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/learn"))
            .and(header("Authorization", "Bearer tok-1"))
            .and(body_json(serde_json::json!({"word_id": 7, "is_correct": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "ok",
                "score_change": -2,
                "is_correct": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let attempt = AnswerAttempt {
            question_id: QuestionId(7),
            selected_option: "dog".into(),
            is_correct: false,
        };
        let receipt = backend(&server)
            .record_answer("tok-1", &attempt)
            .await
            .unwrap();
        assert_eq!(receipt.score_change, Some(-2));
    }

    #[tokio::test]
    async fn record_answer_accepts_empty_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/learn"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let attempt = AnswerAttempt {
            question_id: QuestionId(1),
            selected_option: "x".into(),
            is_correct: true,
        };
        let receipt = backend(&server).record_answer("t", &attempt).await.unwrap();
        assert_eq!(receipt, AnswerReceipt::default());
    }

    #[tokio::test]
    async fn login_returns_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(serde_json::json!({"username": "ann", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "jwt-abc",
                "user_id": 3
            })))
            .mount(&server)
            .await;

        let login = backend(&server).login("ann", "pw").await.unwrap();
        assert_eq!(login.token, "jwt-abc");
        assert_eq!(login.user_id, Some(3));
    }

    #[tokio::test]
    async fn login_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"message": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server).login("ann", "nope").await.unwrap_err();
        assert_eq!(err.user_message("login failed"), "Invalid credentials");
    }

    #[tokio::test]
    async fn register_conflict_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/register"))
            .respond_with(
                ResponseTemplate::new(409)
                    .set_body_json(serde_json::json!({"message": "Username already exists"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server).register("ann", "pw").await.unwrap_err();
        assert_eq!(
            err,
            BackendError::Api {
                status: 409,
                message: Some("Username already exists".into())
            }
        );
    }

    #[tokio::test]
    async fn score_parsed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/score"))
            .and(header("Authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Score retrieved successfully",
                "score": 42,
                "user_id": 3
            })))
            .mount(&server)
            .await;

        let score = backend(&server).score("t").await.unwrap();
        assert_eq!(score.score, 42);
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        // Bind and immediately drop a listener so the port is closed.
        let uri = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };

        let backend = HttpBackend::new(&uri, Duration::from_secs(2)).unwrap();
        let err = backend.fetch_question("t").await.unwrap_err();
        assert!(matches!(err, BackendError::Network(_)), "got {err:?}");
        assert_eq!(err.payload_message(), None);
    }

    #[test]
    fn trailing_slash_trimmed_and_default_used() {
        let backend = HttpBackend::new("http://example.test/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.url("/api/score"), "http://example.test/api/score");

        let backend = HttpBackend::new("", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), DEFAULT_BASE_URL);
    }
}
