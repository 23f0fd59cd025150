//! # groq-demo - Groq LLM 单次调用演示
//!
//! 一个最小的 Groq 集成演示：从注入的配置读取 API 密钥，构造客户端，
//! 把用户输入的提示词发送给模型，并把返回的文本和用量信息渲染为页面。
//!
//! ## 主要特性
//!
//! - 🔐 **密钥管理**：密钥来自环境变量或 `.env` 文件，从不写进代码。
//! - 🧩 **可测试的控制器**：页面逻辑是一个普通的异步函数，输入交互状态，输出页面描述。
//! - 🎛️ **显式参数**：温度和最大 token 数随每次生成请求一起发送。
//! - 🛡️ **错误处理**：所有失败都渲染在页面上，页面始终可以继续交互。
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use groq_demo::{Config, Interaction, PageController, Settings};
//!
//! #[tokio::main]
//! async fn main() {
//!     // 从环境变量加载配置 (需要设置 GROQ_API_KEY)
//!     let controller = PageController::groq(Config::from_env());
//!
//!     let interaction = Interaction::generate("你好，世界！", Settings::default());
//!     let page = controller.handle(&interaction).await;
//!     println!("{}", page);
//! }
//! ```

// 模块定义
pub mod client;
pub mod config;
pub mod error;
pub mod page;
pub mod render;
pub mod types;
mod utils;

pub use client::{GroqClient, LanguageModel};
pub use config::Config;
pub use error::{GroqError, Result};
pub use page::{Interaction, PageController, PageState, Settings};
pub use render::{Page, Widget};
pub use types::{GenerationRequest, LlmResponse};
