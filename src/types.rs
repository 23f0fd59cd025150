//! API 数据结构模块

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

// ================================================================================================
// API 请求结构
// ================================================================================================

/// 对话消息
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Message {
    /// 角色
    pub role: Role,
    /// 内容
    #[serde(default)]
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }
}

/// 角色枚举
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 系统
    System,
    /// 用户
    #[default]
    User,
    /// 机器人
    Assistant,
}

/// `/chat/completions` 请求体
#[derive(Debug, Serialize, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub stream: bool,
}

// ================================================================================================
// API 响应结构
// ================================================================================================

/// API 响应体
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct CompletionResponse {
    /// 响应 ID
    #[serde(default)]
    pub id: String,
    /// 对话选择
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// 创建时间
    #[serde(default)]
    pub created: u64,
    /// 使用模型
    #[serde(default)]
    pub model: String,
    /// 系统指纹
    pub system_fingerprint: Option<String>,
    /// Groq 扩展字段，例如请求 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_groq: Option<Value>,
    /// token 使用情况
    #[serde(default)]
    pub usage: Usage,
}

/// 对话选择
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Choice {
    /// 结束原因
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// 索引
    #[serde(default)]
    pub index: u32,
    /// 消息内容
    #[serde(default)]
    pub message: Message,
}

/// token 使用情况
///
/// Groq 还会返回若干计时字段，全部保留在 `extra` 中
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Usage {
    /// 完成 token 数量
    #[serde(default)]
    pub completion_tokens: u64,
    /// 提示 token 数量
    #[serde(default)]
    pub prompt_tokens: u64,
    /// 总 token 数量
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Usage {
    /// 只保留 token 计数字段
    pub fn token_counts(&self) -> BTreeMap<String, u64> {
        BTreeMap::from([
            ("prompt_tokens".to_string(), self.prompt_tokens),
            ("completion_tokens".to_string(), self.completion_tokens),
            ("total_tokens".to_string(), self.total_tokens),
        ])
    }
}

/// 服务端错误响应体，`{"error": {"message": ...}}`
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

// ================================================================================================
// 应用内部数据模型
// ================================================================================================

/// 单次生成请求
///
/// `temperature` 和 `max_tokens` 为空时使用客户端配置中的默认值
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// 生成结果
///
/// 收到后不再修改，页面按原样展示
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LlmResponse {
    /// 生成的文本内容
    pub content: String,
    /// 实际响应的模型
    pub model: String,
    /// token 计数
    pub usage: BTreeMap<String, u64>,
    /// 其它元数据
    pub metadata: Map<String, Value>,
}

impl LlmResponse {
    /// 详情面板展示的 JSON
    pub fn details_json(&self) -> Value {
        json!({
            "model": self.model,
            "usage": self.usage,
            "metadata": self.metadata,
        })
    }
}
