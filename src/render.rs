//! 页面渲染描述模块
//!
//! 控制器只产出 [`Page`]，如何显示由前端决定。[`Page`] 的 `Display`
//! 实现把页面渲染为终端文本。

use serde_json::Value;
use std::fmt;

// ================================================================================================
// 页面组件
// ================================================================================================

/// 页面上的单个组件
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Title(String),
    Divider,
    Subheader(String),
    Info(String),
    Markdown(String),
    Success(String),
    Error(String),
    Warning(String),
    /// 多行文本输入
    TextArea { label: String, value: String },
    Button { label: String },
    /// 数值范围控件
    Slider {
        label: String,
        min: f64,
        max: f64,
        value: f64,
        step: f64,
    },
    /// 模型返回的正文
    Response(String),
    /// 可折叠区域
    Expander { title: String, children: Vec<Widget> },
    Json(Value),
    Code { language: String, source: String },
}

/// 一次渲染的完整页面
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub widgets: Vec<Widget>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, widget: Widget) -> &mut Self {
        self.widgets.push(widget);
        self
    }

    /// 深度优先遍历所有组件，包括折叠区域内部
    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        let mut stack: Vec<&Widget> = self.widgets.iter().rev().collect();
        std::iter::from_fn(move || {
            let widget = stack.pop()?;
            if let Widget::Expander { children, .. } = widget {
                stack.extend(children.iter().rev());
            }
            Some(widget)
        })
    }

    pub fn errors(&self) -> Vec<&str> {
        self.iter()
            .filter_map(|w| match w {
                Widget::Error(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.iter()
            .filter_map(|w| match w {
                Widget::Warning(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_success(&self) -> bool {
        self.iter().any(|w| matches!(w, Widget::Success(_)))
    }

    pub fn has_controls(&self) -> bool {
        self.iter().any(|w| matches!(w, Widget::Button { .. }))
    }

    pub fn response_text(&self) -> Option<&str> {
        self.iter().find_map(|w| match w {
            Widget::Response(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// 按标题查找折叠区域的子组件
    pub fn find_expander(&self, title: &str) -> Option<&[Widget]> {
        self.iter().find_map(|w| match w {
            Widget::Expander { title: t, children } if t == title => Some(children.as_slice()),
            _ => None,
        })
    }
}

// ================================================================================================
// 终端渲染
// ================================================================================================

fn write_indented(f: &mut fmt::Formatter<'_>, indent: usize, text: &str) -> fmt::Result {
    let pad = " ".repeat(indent);
    for line in text.lines() {
        writeln!(f, "{}{}", pad, line)?;
    }
    Ok(())
}

fn render_widget(f: &mut fmt::Formatter<'_>, widget: &Widget, indent: usize) -> fmt::Result {
    let pad = " ".repeat(indent);
    match widget {
        Widget::Title(text) => {
            writeln!(f, "{}{}", pad, text)?;
            writeln!(f, "{}{}", pad, "=".repeat(text.chars().count()))
        }
        Widget::Divider => writeln!(f, "{}{}", pad, "─".repeat(40)),
        Widget::Subheader(text) => writeln!(f, "\n{}## {}", pad, text),
        Widget::Info(text) => write_indented(f, indent, &format!("ℹ️  {}", text.trim())),
        Widget::Markdown(text) => write_indented(f, indent, text.trim()),
        Widget::Success(text) => writeln!(f, "{}{}", pad, text),
        Widget::Error(text) => writeln!(f, "{}{}", pad, text),
        Widget::Warning(text) => writeln!(f, "{}⚠️  {}", pad, text),
        Widget::TextArea { label, value } => {
            writeln!(f, "{}{}", pad, label)?;
            write_indented(f, indent + 2, &format!("> {}", value))
        }
        Widget::Button { label } => writeln!(f, "{}[ {} ]", pad, label),
        Widget::Slider {
            label,
            min,
            max,
            value,
            ..
        } => writeln!(f, "{}{}: {} (range {}..={})", pad, label, value, min, max),
        Widget::Response(text) => {
            writeln!(f, "{}{}", pad, "─".repeat(40))?;
            write_indented(f, indent, text)?;
            writeln!(f, "{}{}", pad, "─".repeat(40))
        }
        Widget::Expander { title, children } => {
            writeln!(f, "{}▸ {}", pad, title)?;
            for child in children {
                render_widget(f, child, indent + 2)?;
            }
            Ok(())
        }
        Widget::Json(value) => {
            let pretty = serde_json::to_string_pretty(value).map_err(|_| fmt::Error)?;
            write_indented(f, indent, &pretty)
        }
        Widget::Code { language, source } => {
            writeln!(f, "{}```{}", pad, language)?;
            write_indented(f, indent, source.trim())?;
            writeln!(f, "{}```", pad)
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for widget in &self.widgets {
            render_widget(f, widget, 0)?;
        }
        Ok(())
    }
}
