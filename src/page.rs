//! 演示页面控制器
//!
//! 每次交互调用一次 [`PageController::handle`]：读取注入的配置、构造客户端、
//! 做能力探测，只有按下按钮且提示词非空时才发起一次生成请求。所有失败都
//! 写进返回的 [`Page`]，页面本身始终可以继续交互。

use crate::{
    client::{GroqClient, LanguageModel},
    config::{API_KEY_VAR, Config},
    error::Result,
    render::{Page, Widget},
    types::{GenerationRequest, LlmResponse},
};
use log::{debug, info};

// ================================================================================================
// 页面文案
// ================================================================================================

pub const TITLE: &str = "🚀 Groq LLM Integration Demo";
pub const DEFAULT_PROMPT: &str = "Hello! Please explain what you are in one sentence.";
pub const GENERATE_LABEL: &str = "🎯 Generate Response";
pub const DETAILS_TITLE: &str = "📊 Response Details";
pub const EMPTY_PROMPT_WARNING: &str = "Please enter a prompt first!";
pub const MISSING_KEY_ERROR: &str = "❌ GROQ_API_KEY not found in configuration";
pub const UNAVAILABLE_ERROR: &str = "❌ Groq LLM is not available";
pub const CONNECTED_SUCCESS: &str = "✅ Groq LLM Successfully Connected!";

const KEY_MANAGEMENT_INFO: &str = "\
This demo shows how the Groq API key is securely managed:

1. **Local Development**: API key stored in `.env` (excluded from Git)
2. **Production**: API key set in the deployment environment (not exposed in code)
3. **Zero GitHub Exposure**: Keys never committed to version control";

const SETUP_INSTRUCTIONS: &str = "\
**Setup Instructions:**
1. Create `.env` in your project root
2. Add: `GROQ_API_KEY=your_actual_key_here`
3. Get your key from: https://console.groq.com/keys";

const COMMON_ISSUES: &str = "\
**Common Issues:**
1. Missing API key in configuration
2. Invalid API key format
3. Network connectivity issues
4. TLS support not available for outbound HTTPS";

const USAGE_SNIPPET: &str = r#"
use groq_demo::{Config, GroqClient, LanguageModel, GenerationRequest};

// Create the client using the key from the environment or `.env`
let client = GroqClient::new(Config::from_env())?;

// Generate response
let response = client.generate(&GenerationRequest::new("Hello from Rust!")).await?;
println!("{}", response.content);
"#;

const SECRETS_SNIPPET: &str = r#"GROQ_API_KEY=gsk_xxx_your_key_here"#;

// ================================================================================================
// 交互状态
// ================================================================================================

/// 页面上的两个设置滑块
///
/// 构造时会把数值限制在滑块范围内并对齐到步长
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    temperature: f32,
    max_tokens: u32,
}

impl Settings {
    pub const TEMPERATURE_MIN: f32 = 0.0;
    pub const TEMPERATURE_MAX: f32 = 1.0;
    pub const TEMPERATURE_STEP: f32 = 0.1;
    pub const MAX_TOKENS_MIN: u32 = 50;
    pub const MAX_TOKENS_MAX: u32 = 1000;
    pub const MAX_TOKENS_STEP: u32 = 50;

    pub fn new(temperature: f32, max_tokens: u32) -> Self {
        let temperature = if temperature.is_nan() {
            Self::default().temperature
        } else {
            let clamped = temperature.clamp(Self::TEMPERATURE_MIN, Self::TEMPERATURE_MAX);
            (clamped / Self::TEMPERATURE_STEP).round() * Self::TEMPERATURE_STEP
        };

        let clamped = max_tokens.clamp(Self::MAX_TOKENS_MIN, Self::MAX_TOKENS_MAX);
        let steps = (clamped + Self::MAX_TOKENS_STEP / 2) / Self::MAX_TOKENS_STEP;
        let max_tokens = (steps * Self::MAX_TOKENS_STEP).min(Self::MAX_TOKENS_MAX);

        Self {
            temperature,
            max_tokens,
        }
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn with_temperature(self, temperature: f32) -> Self {
        Self::new(temperature, self.max_tokens)
    }

    pub fn with_max_tokens(self, max_tokens: u32) -> Self {
        Self::new(self.temperature, max_tokens)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 500,
        }
    }
}

/// 一次交互提交的 UI 状态
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub prompt: String,
    pub settings: Settings,
    /// 本次交互是否按下了生成按钮
    pub generate_pressed: bool,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            settings: Settings::default(),
            generate_pressed: false,
        }
    }
}

impl Interaction {
    /// 按下生成按钮的交互
    pub fn generate(prompt: impl Into<String>, settings: Settings) -> Self {
        Self {
            prompt: prompt.into(),
            settings,
            generate_pressed: true,
        }
    }

    fn request(&self) -> GenerationRequest {
        GenerationRequest::new(self.prompt.clone())
            .with_temperature(self.settings.temperature())
            .with_max_tokens(self.settings.max_tokens())
    }
}

/// 单次渲染结束时页面所处的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    NoKey,
    ClientUnavailable,
    ClientReady,
    WarningShown,
    ResultShown,
    ErrorShown,
}

// ================================================================================================
// 页面控制器
// ================================================================================================

/// 演示页面控制器
///
/// `factory` 只在密钥存在时被调用，每次渲染构造一个新的客户端
pub struct PageController<F> {
    config: Config,
    factory: F,
}

impl PageController<fn(&Config) -> Result<GroqClient>> {
    /// 使用真实 Groq 客户端的控制器
    pub fn groq(config: Config) -> Self {
        Self::new(config, |config: &Config| GroqClient::new(config.clone()))
    }
}

impl<F, M> PageController<F>
where
    F: Fn(&Config) -> Result<M>,
    M: LanguageModel,
{
    pub fn new(config: Config, factory: F) -> Self {
        Self { config, factory }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 处理一次交互并返回要渲染的页面
    pub async fn handle(&self, interaction: &Interaction) -> Page {
        self.handle_with_state(interaction).await.0
    }

    /// 同 [`handle`](Self::handle)，额外返回页面最终状态
    pub async fn handle_with_state(&self, interaction: &Interaction) -> (Page, PageState) {
        let mut page = Page::new();
        page.push(Widget::Title(TITLE.into()))
            .push(Widget::Divider)
            .push(Widget::Subheader("🔐 Secure API Key Management".into()))
            .push(Widget::Info(KEY_MANAGEMENT_INFO.into()));

        let state = match self.run(interaction, &mut page).await {
            Ok(state) => state,
            Err(e) => {
                debug!("Demo page failed: {}", e);
                page.push(Widget::Error(format!("❌ Error initializing Groq LLM: {}", e)))
                    .push(Widget::Markdown(COMMON_ISSUES.into()));
                PageState::ErrorShown
            }
        };
        debug!("Page rendered in state {:?}", state);
        (page, state)
    }

    async fn run(&self, interaction: &Interaction, page: &mut Page) -> Result<PageState> {
        if !self.config.has_api_key() {
            debug!("{} is not configured", API_KEY_VAR);
            page.push(Widget::Error(MISSING_KEY_ERROR.into()))
                .push(Widget::Markdown(SETUP_INSTRUCTIONS.into()));
            return Ok(PageState::NoKey);
        }

        let llm = (self.factory)(&self.config)?;
        if !llm.is_available() {
            page.push(Widget::Error(UNAVAILABLE_ERROR.into()));
            return Ok(PageState::ClientUnavailable);
        }

        page.push(Widget::Success(CONNECTED_SUCCESS.into()))
            .push(Widget::Subheader("💬 Try the LLM".into()))
            .push(Widget::TextArea {
                label: "Enter your prompt:".into(),
                value: interaction.prompt.clone(),
            })
            .push(Widget::Button {
                label: GENERATE_LABEL.into(),
            });

        let mut state = PageState::ClientReady;
        if interaction.generate_pressed {
            if interaction.prompt.trim().is_empty() {
                page.push(Widget::Warning(EMPTY_PROMPT_WARNING.into()));
                state = PageState::WarningShown;
            } else {
                info!("Generating response...");
                let response = llm.generate(&interaction.request()).await?;
                push_response(page, &response);
                state = PageState::ResultShown;
            }
        }

        push_settings(page, &interaction.settings);
        push_implementation(page);
        Ok(state)
    }
}

fn push_response(page: &mut Page, response: &LlmResponse) {
    page.push(Widget::Subheader("🤖 Response".into()))
        .push(Widget::Response(response.content.clone()))
        .push(Widget::Expander {
            title: DETAILS_TITLE.into(),
            children: vec![Widget::Json(response.details_json())],
        });
}

fn push_settings(page: &mut Page, settings: &Settings) {
    page.push(Widget::Subheader("⚙️ Settings".into()))
        .push(Widget::Slider {
            label: "Temperature".into(),
            min: f64::from(Settings::TEMPERATURE_MIN),
            max: f64::from(Settings::TEMPERATURE_MAX),
            value: (f64::from(settings.temperature()) * 10.0).round() / 10.0,
            step: 0.1,
        })
        .push(Widget::Slider {
            label: "Max Tokens".into(),
            min: f64::from(Settings::MAX_TOKENS_MIN),
            max: f64::from(Settings::MAX_TOKENS_MAX),
            value: f64::from(settings.max_tokens()),
            step: f64::from(Settings::MAX_TOKENS_STEP),
        });
}

fn push_implementation(page: &mut Page) {
    page.push(Widget::Subheader("📝 Implementation Code".into()))
        .push(Widget::Expander {
            title: "View the secure implementation".into(),
            children: vec![
                Widget::Code {
                    language: "rust".into(),
                    source: USAGE_SNIPPET.into(),
                },
                Widget::Markdown("**Secrets setup (.env):**".into()),
                Widget::Code {
                    language: "dotenv".into(),
                    source: SECRETS_SNIPPET.into(),
                },
                Widget::Markdown("**Gitignore entry:**".into()),
                Widget::Code {
                    language: "text".into(),
                    source: ".env".into(),
                },
            ],
        });
}
