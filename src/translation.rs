use crate::config::Config;
use crate::error::TranslationError;
use crate::language::language_name;
use crate::retry::{with_retry, RetryConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A machine-translation backend.
///
/// Implementations make a single attempt; retrying is the caller's job
/// (see [`translate_with_retry`]).
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        dest: &str,
    ) -> Result<String, TranslationError>;
}

/// Translate `text`, retrying per `retry` and stripping surrounding whitespace.
///
/// A reply that is blank once stripped counts as a failed attempt.
pub async fn translate_with_retry<T>(
    translator: &T,
    retry: &RetryConfig,
    text: &str,
    source: &str,
    dest: &str,
) -> Result<String, TranslationError>
where
    T: Translator + ?Sized,
{
    with_retry(
        retry,
        &format!("Translation {} -> {}", source, dest),
        || async move {
            let translated = translator.translate(text, source, dest).await?;
            let translated = translated.trim();
            if translated.is_empty() {
                return Err(TranslationError::EmptyResponse);
            }
            Ok(translated.to_string())
        },
    )
    .await
}

/// OpenAI Chat Completion request for translation
#[derive(Debug, Serialize)]
struct TranslationRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Build the system prompt for translating a vocabulary-game label
fn build_translation_system_prompt(source: &str, dest: &str) -> String {
    format!(
        r#"You are a professional translator for a vocabulary game. Translate the user's text from {} to {}.

### Rules:
- Reply with the translation only, without quotes, notes or alternatives
- Keep the translation as short as the original (single words stay single words)
- Keep proper names, numbers and emojis unchanged"#,
        language_name(source),
        language_name(dest)
    )
}

/// Translator backed by the OpenAI chat completions API.
pub struct OpenAiTranslator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl OpenAiTranslator {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            api_url: config.openai_api_url.clone(),
        }
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        dest: &str,
    ) -> Result<String, TranslationError> {
        let request = TranslationRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_translation_system_prompt(source, dest),
                },
                Message {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslationError::Api { status, body });
        }

        let chat_response: ChatResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(TranslationError::EmptyResponse)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Translator double returning canned answers and recording every call.
    ///
    /// Unknown `(text, dest)` pairs translate to `"{text}@{dest}"`.
    #[derive(Default)]
    pub struct CannedTranslator {
        answers: HashMap<(String, String), String>,
        failures_left: Mutex<u32>,
        pub calls: Mutex<Vec<(String, String, String)>>,
    }

    impl CannedTranslator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_answer(mut self, text: &str, dest: &str, answer: &str) -> Self {
            self.answers
                .insert((text.to_string(), dest.to_string()), answer.to_string());
            self
        }

        /// Fail the next `count` calls before answering.
        pub fn failing(self, count: u32) -> Self {
            *self.failures_left.lock().unwrap() = count;
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Translator for CannedTranslator {
        async fn translate(
            &self,
            text: &str,
            source: &str,
            dest: &str,
        ) -> Result<String, TranslationError> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), source.to_string(), dest.to_string()));

            {
                let mut failures = self.failures_left.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(TranslationError::Unavailable("canned failure".to_string()));
                }
            }

            Ok(self
                .answers
                .get(&(text.to_string(), dest.to_string()))
                .cloned()
                .unwrap_or_else(|| format!("{}@{}", text, dest)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::CannedTranslator;
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn create_test_config(api_url: &str) -> Config {
        Config {
            levels_dir: PathBuf::from("public/levels"),
            overrides_file: None,
            upgrade_levels: 2..=20,
            openai_api_key: "test-openai-key".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_url: api_url.to_string(),
        }
    }

    fn create_openai_response(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": content
                    },
                    "finish_reason": "stop"
                }
            ]
        })
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig::new(5, Duration::from_millis(1))
    }

    // ==================== Prompt Tests ====================

    #[test]
    fn test_system_prompt_names_languages() {
        let prompt = build_translation_system_prompt("zh-cn", "ja");
        assert!(prompt.contains("Simplified Chinese"));
        assert!(prompt.contains("Japanese"));
        assert!(prompt.contains("translation only"));
    }

    #[test]
    fn test_translation_request_serialization() {
        let request = TranslationRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: "苹果".to_string(),
            }],
            temperature: 0.2,
        };

        let json = serde_json::to_string(&request).expect("Should serialize");
        assert!(json.contains("gpt-4o-mini"));
        assert!(json.contains("苹果"));
        assert!(json.contains("0.2"));
    }

    // ==================== OpenAI Translator Tests ====================

    #[tokio::test]
    async fn test_openai_translator_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-openai-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_openai_response("apple")),
            )
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let translator = OpenAiTranslator::new(reqwest::Client::new(), &config);

        let result = translator
            .translate("苹果", "zh-cn", "en")
            .await
            .expect("Should succeed");
        assert_eq!(result, "apple");
    }

    #[tokio::test]
    async fn test_openai_translator_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let translator = OpenAiTranslator::new(reqwest::Client::new(), &config);

        let err = translator.translate("苹果", "zh-cn", "en").await.unwrap_err();
        assert!(matches!(err, TranslationError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_openai_translator_empty_choices() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let translator = OpenAiTranslator::new(reqwest::Client::new(), &config);

        let err = translator.translate("苹果", "zh-cn", "en").await.unwrap_err();
        assert!(matches!(err, TranslationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_translate_with_retry_recovers_from_server_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_openai_response("  りんご \n")),
            )
            .mount(&mock_server)
            .await;

        let config = create_test_config(&format!("{}/v1/chat/completions", mock_server.uri()));
        let translator = OpenAiTranslator::new(reqwest::Client::new(), &config);

        let result = translate_with_retry(&translator, &fast_retry(), "苹果", "zh-cn", "ja")
            .await
            .expect("Should succeed after retries");
        assert_eq!(result, "りんご");
    }

    // ==================== Retry Helper Tests ====================

    #[tokio::test]
    async fn test_translate_with_retry_strips_result() {
        let translator = CannedTranslator::new().with_answer("水果", "en", "  fruits\n");

        let result = translate_with_retry(&translator, &fast_retry(), "水果", "zh-cn", "en")
            .await
            .expect("Should succeed");
        assert_eq!(result, "fruits");
        assert_eq!(translator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_translate_with_retry_rejects_blank_reply() {
        let translator = CannedTranslator::new().with_answer("苹果", "ja", "   ");

        let err = translate_with_retry(&translator, &fast_retry(), "苹果", "zh-cn", "ja")
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::EmptyResponse));
        assert_eq!(translator.call_count(), 5);
    }

    #[tokio::test]
    async fn test_translate_with_retry_gives_up_after_five_attempts() {
        let translator = CannedTranslator::new().failing(10);

        let err = translate_with_retry(&translator, &fast_retry(), "水果", "zh-cn", "en")
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::Unavailable(_)));
        assert_eq!(translator.call_count(), 5);
    }
}
