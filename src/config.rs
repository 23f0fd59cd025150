//! 配置模块
use crate::error::Result;
use nanorand::{Rng, WyRand};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;

// ===============================================================================================
// 配置模块
// ===============================================================================================

/// 存放 Groq API 密钥的变量名
pub const API_KEY_VAR: &str = "GROQ_API_KEY";
/// 覆盖默认模型的变量名
pub const MODEL_VAR: &str = "GROQ_MODEL";
/// 覆盖 API 基础 URL 的变量名
pub const API_BASE_VAR: &str = "GROQ_API_BASE";

/// Groq 客户端与演示页面的配置
///
/// 由调用方构造后注入页面控制器，密钥可以缺失，缺失本身是页面状态而不是配置错误
#[derive(Debug, Clone)]
pub struct Config {
    /// 模型名称
    pub(crate) model: String,
    /// 系统消息
    pub(crate) system_message: String,
    /// 默认温度参数 (0.0-1.0)
    pub(crate) temperature: f32,
    /// 默认最大生成 token 数
    pub(crate) max_tokens: u32,
    /// 请求超时时间
    pub(crate) timeout: Duration,
    /// API 基础 URL
    pub(crate) api_base: String,
    /// API 密钥
    pub(crate) api_key: Option<String>,
    /// 随机种子
    pub(crate) random_seed: Option<u64>,
}

impl Default for Config {
    /// 创建默认配置
    ///
    /// 使用 Groq 上响应最快的 Llama 模型作为默认选择
    fn default() -> Self {
        Self {
            model: "llama-3.1-8b-instant".into(),
            system_message: "You are a helpful AI assistant.".into(),
            temperature: 0.3,
            max_tokens: 500,
            timeout: Duration::from_secs(60),
            api_base: "https://api.groq.com/openai/v1".into(),
            api_key: None,
            random_seed: None,
        }
    }
}

/// 生成 Config Builder 方法的宏
///
/// 自动生成 `with_field_name` 形式的 builder 方法
macro_rules! config_builder {
    ($field:ident, $type:ty) => {
        paste::paste! {
            #[doc = "设置 `"]
            #[doc = stringify!($field)]
            #[doc = "`"]
            pub fn [<with_ $field>](mut self, $field: $type) -> Self {
                self.$field = $field;
                self
            }
        }
    };
    ($field:ident, $type:ty, option) => {
        paste::paste! {
            #[doc = "设置 `"]
            #[doc = stringify!($field)]
            #[doc = "`"]
            pub fn [<with_ $field>](mut self, $field: $type) -> Self {
                self.$field = Some($field);
                self
            }
        }
    };
}

impl Config {
    pub fn model(&self) -> &str { &self.model }
    pub fn system_message(&self) -> &str { &self.system_message }
    pub fn temperature(&self) -> f32 { self.temperature }
    pub fn max_tokens(&self) -> u32 { self.max_tokens }
    pub fn timeout(&self) -> Duration { self.timeout }
    pub fn api_base(&self) -> &str { &self.api_base }
    pub fn random_seed(&self) -> Option<u64> { self.random_seed }

    /// API 密钥，空白字符串视为缺失
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// 是否存在可用的 API 密钥
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// 从任意键值来源构建配置
    ///
    /// 缺失的模型和基础 URL 使用默认值，缺失的密钥保持为 `None`
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Config {
            api_key: non_empty(API_KEY_VAR).map(|k| k.trim().to_string()),
            model: non_empty(MODEL_VAR).unwrap_or(defaults.model.clone()),
            api_base: non_empty(API_BASE_VAR)
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base.clone()),
            ..defaults
        }
    }

    /// 从环境变量和 `.env` 文件加载配置
    ///
    /// 环境变量会覆盖 `.env` 文件中的设置
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {}", e);
        }
        Self::from_vars(|key| env::var(key).ok())
    }

    /// 从指定的密钥文件加载配置，不读取进程环境变量
    pub fn from_dotenv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path.as_ref())? {
            let (key, value) = item?;
            vars.insert(key, value);
        }
        Ok(Self::from_vars(|key| vars.get(key).cloned()))
    }

    // 使用宏生成 builder 方法
    config_builder!(api_base, String);
    config_builder!(model, String);
    config_builder!(api_key, String, option);
    config_builder!(system_message, String);
    config_builder!(temperature, f32);
    config_builder!(max_tokens, u32);
    config_builder!(timeout, Duration);
    config_builder!(random_seed, u64, option);

    /// 自动生成随机种子
    ///
    /// 使用高性能的 WyRand 算法生成随机种子
    pub fn with_random_seed_auto(mut self) -> Self {
        self.random_seed = Some(WyRand::new().generate::<u64>());
        self
    }
}
