//! groq-demo 交互式终端前端
//!
//! 每输入一行就是一次交互：
//! - `:temperature 0.5` / `:max_tokens 300` 调整设置
//! - `:show` 重新渲染页面，不发起请求
//! - `:quit` 退出
//! - 其它任意内容作为提示词并按下生成按钮

use groq_demo::{Config, Interaction, PageController, Result, Settings};
use log::info;
use tokio::io::{self, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// 解析后的一行输入
#[derive(Debug, PartialEq)]
enum Command {
    Temperature(f32),
    MaxTokens(u32),
    Show,
    Quit,
    Prompt(String),
    Invalid(String),
}

fn parse_line(line: &str) -> Command {
    let Some(rest) = line.trim().strip_prefix(':') else {
        return Command::Prompt(line.to_string());
    };
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "q"), None) => Command::Quit,
        (Some("show"), None) => Command::Show,
        (Some("temperature"), Some(v)) => v
            .parse()
            .map(Command::Temperature)
            .unwrap_or_else(|_| Command::Invalid(format!("invalid temperature: {}", v))),
        (Some("max_tokens"), Some(v)) => v
            .parse()
            .map(Command::MaxTokens)
            .unwrap_or_else(|_| Command::Invalid(format!("invalid max tokens: {}", v))),
        _ => Command::Invalid(format!("unknown command: :{}", rest)),
    }
}

const PROMPT_BANNER: &str = "\n💬 prompt (:quit to exit) > ";
const BUSY_NOTICE: &str = "⏳ Generating response...\n";

/// 终端会话状态，跨交互保留设置和最近一次输入的提示词
#[derive(Debug)]
struct Session {
    settings: Settings,
    prompt: String,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            prompt: Interaction::default().prompt,
        }
    }
}

impl Session {
    /// 把命令转换为一次交互，`Quit` 和 `Invalid` 不产生交互
    fn interaction(&mut self, command: Command) -> Option<Interaction> {
        let generate_pressed = match command {
            Command::Temperature(t) => {
                self.settings = self.settings.with_temperature(t);
                false
            }
            Command::MaxTokens(n) => {
                self.settings = self.settings.with_max_tokens(n);
                false
            }
            Command::Show => false,
            Command::Prompt(prompt) => {
                self.prompt = prompt;
                true
            }
            Command::Quit | Command::Invalid(_) => return None,
        };
        Some(Interaction {
            prompt: self.prompt.clone(),
            settings: self.settings,
            generate_pressed,
        })
    }
}

async fn write_banner<W: AsyncWrite + Unpin>(out: &mut W) -> Result<()> {
    out.write_all(PROMPT_BANNER.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::from_env();
    info!("Starting demo with model {}", config.model());
    let controller = PageController::groq(config);

    let mut session = Session::default();
    let mut stdout = io::stdout();
    let page = controller.handle(&Interaction::default()).await;
    stdout.write_all(page.to_string().as_bytes()).await?;

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        write_banner(&mut stdout).await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let interaction = match parse_line(&line) {
            Command::Quit => break,
            Command::Invalid(msg) => {
                stdout.write_all(format!("⚠️  {}\n", msg).as_bytes()).await?;
                continue;
            }
            command => match session.interaction(command) {
                Some(interaction) => interaction,
                None => continue,
            },
        };

        if interaction.generate_pressed {
            stdout.write_all(BUSY_NOTICE.as_bytes()).await?;
            stdout.flush().await?;
        }
        let page = controller.handle(&interaction).await;
        stdout.write_all(page.to_string().as_bytes()).await?;
    }

    stdout.write_all("\n👋 Bye\n".as_bytes()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line(":quit"), Command::Quit);
        assert_eq!(parse_line(" :show "), Command::Show);
        assert_eq!(parse_line(":temperature 0.5"), Command::Temperature(0.5));
        assert_eq!(parse_line(":max_tokens 300"), Command::MaxTokens(300));
        assert_eq!(parse_line("Hi there"), Command::Prompt("Hi there".into()));
        assert_eq!(parse_line(""), Command::Prompt(String::new()));
        assert!(matches!(parse_line(":max_tokens lots"), Command::Invalid(_)));
        assert!(matches!(parse_line(":reset"), Command::Invalid(_)));
    }

    #[test]
    fn test_settings_change_keeps_last_prompt() {
        let mut session = Session::default();
        let pressed = session.interaction(Command::Prompt("Explain Rust".into())).unwrap();
        assert!(pressed.generate_pressed);
        assert_eq!(pressed.prompt, "Explain Rust");

        let adjusted = session.interaction(Command::Temperature(0.8)).unwrap();
        assert!(!adjusted.generate_pressed);
        assert_eq!(adjusted.prompt, "Explain Rust");
        assert!((adjusted.settings.temperature() - 0.8).abs() < 1e-6);

        let adjusted = session.interaction(Command::MaxTokens(300)).unwrap();
        assert_eq!(adjusted.prompt, "Explain Rust");
        assert_eq!(adjusted.settings.max_tokens(), 300);

        let shown = session.interaction(Command::Show).unwrap();
        assert_eq!(shown.prompt, "Explain Rust");
        assert!(session.interaction(Command::Quit).is_none());
    }

    #[tokio::test]
    async fn test_write_banner() {
        let mut out: Vec<u8> = Vec::new();
        write_banner(&mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), PROMPT_BANNER);
        assert!(PROMPT_BANNER.contains("💬"));
    }
}
