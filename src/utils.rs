//! 工具函数模块
use crate::types::{Message, Role};

/// 准备发送到 API 的消息列表
///
/// 如果系统消息不为空，则将其作为第一条消息。
pub(crate) fn prepare_messages(system_message: &str, prompt: &str) -> Vec<Message> {
    let system = (!system_message.trim().is_empty()).then(|| Message::new(Role::System, system_message));
    system
        .into_iter()
        .chain(std::iter::once(Message::new(Role::User, prompt)))
        .collect()
}

/// 截断过长的文本，用于日志输出
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
