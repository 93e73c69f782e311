//! Study plan generation through an OpenAI compatible chat completions API.

use async_trait::async_trait;
use planner_domain::{GeneratedPlan, PlanError, PlanGenerator};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::PlanApiSettings;

const SYSTEM_PROMPT: &str = "You are a study planner. Reply with a single JSON object of the form \
{\"topics\": [string], \"schedule\": [string]}. `topics` lists the topics to learn in order, \
`schedule` lists dated or numbered study sessions. Do not add any other keys or prose.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

pub struct OpenAiPlanGenerator {
    client: Client,
    settings: PlanApiSettings,
}

impl OpenAiPlanGenerator {
    pub fn new(settings: PlanApiSettings) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client, settings })
    }
}

/// Models sometimes wrap JSON in a markdown code fence.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_plan(content: &str) -> Result<GeneratedPlan, PlanError> {
    serde_json::from_str(strip_code_fence(content))
        .map_err(|e| PlanError::Generation(format!("Failed to parse plan: {}", e)))
}

#[async_trait]
impl PlanGenerator for OpenAiPlanGenerator {
    async fn generate_plan(&self, subject: &str) -> Result<GeneratedPlan, PlanError> {
        debug!(subject, model = %self.settings.model, "Requesting study plan");

        let request = ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Create a study plan for: {}", subject),
                },
            ],
            temperature: 0.3,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.settings.base_url))
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PlanError::Generation(format!("Failed to call plan API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PlanError::Generation(format!(
                "Plan API error: {} - {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| PlanError::Generation(format!("Failed to parse plan API response: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PlanError::Generation("No choices returned from plan API".to_string()))?;

        parse_plan(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(server: &MockServer) -> OpenAiPlanGenerator {
        OpenAiPlanGenerator::new(PlanApiSettings {
            base_url: server.uri(),
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn completion(content: &str) -> serde_json::Value {
        json!({
            "choices": [
                { "index": 0, "message": { "role": "assistant", "content": content } }
            ]
        })
    }

    #[tokio::test]
    async fn test_parses_topics_and_schedule() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "model": "test-model" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(
                r#"{"topics": ["Cells", "Genetics"], "schedule": ["Mon: Cells", "Tue: Genetics"]}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let plan = generator(&server).generate_plan("Biology").await.unwrap();

        assert_eq!(plan.topics, vec!["Cells", "Genetics"]);
        assert_eq!(plan.schedule, vec!["Mon: Cells", "Tue: Genetics"]);
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"{"topics": ["Cells"]}"#)))
            .mount(&server)
            .await;

        let plan = generator(&server).generate_plan("Biology").await.unwrap();

        assert_eq!(plan.topics, vec!["Cells"]);
        assert!(plan.schedule.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let result = generator(&server).generate_plan("Biology").await;

        match result {
            Err(PlanError::Generation(msg)) => assert!(msg.contains("503")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_content_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Sure! Here is your plan.")))
            .mount(&server)
            .await;

        let result = generator(&server).generate_plan("Biology").await;

        assert!(matches!(result, Err(PlanError::Generation(_))));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let result = generator(&server).generate_plan("Biology").await;

        assert!(matches!(result, Err(PlanError::Generation(_))));
    }

    #[test]
    fn test_code_fenced_json_is_accepted() {
        let plan = parse_plan("```json\n{\"topics\": [\"A\"], \"schedule\": [\"B\"]}\n```").unwrap();

        assert_eq!(plan.topics, vec!["A"]);
        assert_eq!(plan.schedule, vec!["B"]);
    }
}
