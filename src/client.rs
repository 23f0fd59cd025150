//! LLM 客户端核心模块
use crate::{
    config::Config,
    error::{GroqError, Result},
    types::{ApiErrorBody, ChatCompletionRequest, CompletionResponse, GenerationRequest, LlmResponse},
    utils::{prepare_messages, preview},
};
use log::{debug, info};
use reqwest::{
    Client, Url,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

// ================================================================================================
// 语言模型接口
// ================================================================================================

/// 页面控制器使用的语言模型接口
///
/// 只包含能力探测和单次生成两个操作
pub trait LanguageModel {
    /// 客户端是否可以发起请求
    fn is_available(&self) -> bool;

    /// 为给定请求生成一次完整响应
    fn generate(&self, request: &GenerationRequest) -> impl Future<Output = Result<LlmResponse>>;
}

// ================================================================================================
// Groq 客户端
// ================================================================================================

/// Groq API 客户端
///
/// 调用 OpenAI 兼容的 `/chat/completions` 接口，只支持非流式请求
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: Arc<Client>,
    config: Arc<Config>,
    endpoint: String,
}

impl GroqClient {
    /// 创建一个新的 `GroqClient` 实例
    ///
    /// 密钥缺失或格式无效时返回 `GroqError::Config`
    pub fn new(config: Config) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| GroqError::Config("GROQ_API_KEY is missing or empty".into()))?;
        let headers = build_headers(api_key)?;

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;
        let endpoint = format!("{}/chat/completions", config.api_base.trim_end_matches('/'));

        debug!("Groq client ready: model={}, endpoint={}", config.model, endpoint);
        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
            endpoint,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 只返回生成文本的便捷方法
    pub async fn generate_text(&self, prompt: &str) -> Result<String> {
        self.generate(&GenerationRequest::new(prompt))
            .await
            .map(|res| res.content)
    }

    /// 组装请求体，请求中的参数优先于配置默认值
    fn build_body(&self, request: &GenerationRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: prepare_messages(&self.config.system_message, &request.prompt),
            temperature: request.temperature.unwrap_or(self.config.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            seed: self.config.random_seed,
            stream: false,
        }
    }

    async fn call_api(&self, body: &ChatCompletionRequest) -> Result<CompletionResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(GroqError::from_transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(GroqError::from_transport)?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            let detail = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            debug!("Groq request failed with status {}: {}", status, detail);
            return Err(GroqError::from_status(status, detail));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl LanguageModel for GroqClient {
    fn is_available(&self) -> bool {
        self.config.has_api_key()
            && !self.config.model.trim().is_empty()
            && Url::parse(&self.endpoint).is_ok()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse> {
        let start = Instant::now();
        let body = self.build_body(request);
        info!(
            "Generating with {} (temperature={}, max_tokens={}): {}",
            body.model,
            body.temperature,
            body.max_tokens,
            preview(&request.prompt, 60)
        );

        let completion = self.call_api(&body).await?;
        let latency_ms = start.elapsed().as_millis() as u64;

        let choice = completion.choices.into_iter().next().ok_or(GroqError::NoContent)?;

        let mut metadata = Map::new();
        metadata.insert("id".into(), Value::from(completion.id));
        metadata.insert("created".into(), Value::from(completion.created));
        if let Some(reason) = choice.finish_reason {
            metadata.insert("finish_reason".into(), Value::from(reason));
        }
        if let Some(fingerprint) = completion.system_fingerprint {
            metadata.insert("system_fingerprint".into(), Value::from(fingerprint));
        }
        if let Some(x_groq) = completion.x_groq {
            metadata.insert("x_groq".into(), x_groq);
        }
        if !completion.usage.extra.is_empty() {
            metadata.insert("timing".into(), Value::Object(completion.usage.extra.clone()));
        }
        metadata.insert("latency_ms".into(), Value::from(latency_ms));

        let model = if completion.model.is_empty() {
            body.model
        } else {
            completion.model
        };
        debug!("Groq response in {} ms, {} total tokens", latency_ms, completion.usage.total_tokens);

        Ok(LlmResponse {
            content: choice.message.content,
            model,
            usage: completion.usage.token_counts(),
            metadata,
        })
    }
}

/// 构建 API 请求所需的 HTTP 标头
fn build_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
        .map_err(|e| GroqError::Config(format!("Invalid API key format: {}", e)))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> Config {
        Config::default()
            .with_api_key("gsk_test".to_string())
            .with_api_base(format!("{}/openai/v1", server.uri()))
    }

    fn completion_body(content: &str) -> Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1730000000,
            "model": "llama-3.1-8b-instant",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 7, "completion_tokens": 3, "total_tokens": 10},
            "system_fingerprint": "fp_1"
        })
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = GroqClient::new(Config::default());
        assert!(matches!(result, Err(GroqError::Config(_))));
    }

    #[test]
    fn test_new_rejects_invalid_key_format() {
        let config = Config::default().with_api_key("gsk\nbroken".to_string());
        assert!(matches!(GroqClient::new(config), Err(GroqError::Config(_))));
    }

    #[test]
    fn test_is_available() {
        let client = GroqClient::new(Config::default().with_api_key("gsk_test".to_string())).unwrap();
        assert!(client.is_available());

        let client = GroqClient::new(
            Config::default()
                .with_api_key("gsk_test".to_string())
                .with_api_base("not a url".to_string()),
        )
        .unwrap();
        assert!(!client.is_available());
    }

    #[tokio::test]
    async fn test_generate_maps_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GroqClient::new(config_for(&server)).unwrap();
        let resp = client.generate(&GenerationRequest::new("Hi")).await.unwrap();

        assert_eq!(resp.content, "Hello");
        assert_eq!(resp.model, "llama-3.1-8b-instant");
        assert_eq!(resp.usage["total_tokens"], 10);
        assert_eq!(resp.metadata["finish_reason"], "stop");
        assert_eq!(resp.metadata["id"], "chatcmpl-1");
        assert!(resp.metadata.contains_key("latency_ms"));
    }

    #[tokio::test]
    async fn test_generate_forwards_settings() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(body_partial_json(json!({
                "temperature": 0.5,
                "max_tokens": 150,
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let client = GroqClient::new(config_for(&server)).unwrap();
        let request = GenerationRequest::new("Hi")
            .with_temperature(0.5)
            .with_max_tokens(150);
        let text = client.generate(&request).await.unwrap().content;
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_generate_text_uses_config_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"max_tokens": 500})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("defaults")))
            .mount(&server)
            .await;

        let client = GroqClient::new(config_for(&server)).unwrap();
        assert_eq!(client.generate_text("Hi").await.unwrap(), "defaults");
    }

    #[tokio::test]
    async fn test_generate_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let client = GroqClient::new(config_for(&server)).unwrap();
        let err = client.generate(&GenerationRequest::new("Hi")).await.unwrap_err();
        assert!(matches!(err, GroqError::Auth(ref m) if m == "Invalid API Key"));
    }

    #[tokio::test]
    async fn test_generate_rate_limited_plain_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("too many requests"))
            .mount(&server)
            .await;

        let client = GroqClient::new(config_for(&server)).unwrap();
        let err = client.generate(&GenerationRequest::new("Hi")).await.unwrap_err();
        assert!(matches!(err, GroqError::RateLimit(ref m) if m == "too many requests"));
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body("too late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = config_for(&server).with_timeout(Duration::from_millis(50));
        let client = GroqClient::new(config).unwrap();
        let err = client.generate(&GenerationRequest::new("Hi")).await.unwrap_err();
        assert!(matches!(err, GroqError::Timeout), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_generate_keeps_groq_extras_in_metadata() {
        let server = MockServer::start().await;
        let mut body = completion_body("Hello");
        body["x_groq"] = json!({"id": "req_42"});
        body["usage"]["queue_time"] = json!(0.25);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = GroqClient::new(config_for(&server)).unwrap();
        let resp = client.generate(&GenerationRequest::new("Hi")).await.unwrap();
        assert_eq!(resp.metadata["x_groq"]["id"], "req_42");
        assert_eq!(resp.metadata["timing"]["queue_time"], 0.25);
        assert!(!resp.usage.contains_key("queue_time"));
    }

    #[tokio::test]
    async fn test_generate_without_choices() {
        let server = MockServer::start().await;
        let mut body = completion_body("unused");
        body["choices"] = json!([]);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = GroqClient::new(config_for(&server)).unwrap();
        let err = client.generate(&GenerationRequest::new("Hi")).await.unwrap_err();
        assert!(matches!(err, GroqError::NoContent));
    }
}
