//! 诊断渲染器
//!
//! Renders an error message with its location and the offending source line:
//!
//! ```text
//! error: Missing semicolon at [1:11 - 1:11]: reached end of input
//!  --> main.sl:1:11
//!    1 | int x = 1
//!      |           ^
//! ```

use crate::util::span::{SourceFile, Span};
use owo_colors::OwoColorize;

/// 渲染器配置
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// 是否启用颜色输出
    pub use_colors: bool,
    /// 是否显示源码片段
    pub show_source: bool,
    /// 指示字符
    pub indicator: char,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            show_source: true,
            indicator: '^',
        }
    }
}

/// A single error report
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    pub fn error(
        message: impl Into<String>,
        span: Option<Span>,
    ) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// 文本诊断渲染器
#[derive(Debug, Clone, Default)]
pub struct TextEmitter {
    config: EmitterConfig,
}

impl TextEmitter {
    /// 创建新的文本渲染器
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用自定义配置创建渲染器
    pub fn with_config(config: EmitterConfig) -> Self {
        Self { config }
    }

    /// 渲染诊断到指定源码文件
    pub fn render(
        &self,
        diagnostic: &Diagnostic,
        source_file: Option<&SourceFile>,
    ) -> String {
        let mut output = format!("{}: {}\n", self.paint_error("error"), diagnostic.message);

        let Some(span) = diagnostic.span.filter(|span| !span.is_dummy()) else {
            return output;
        };
        let file_name = source_file.map_or("<input>", |file| file.name.as_str());
        output.push_str(&format!(
            " --> {}:{}:{}\n",
            file_name, span.start.line, span.start.column
        ));

        if self.config.show_source {
            if let Some(snippet) = source_file.and_then(|file| self.render_snippet(span, file)) {
                output.push_str(&snippet);
            }
        }
        output
    }

    /// 渲染源码片段（只显示起始行）
    fn render_snippet(
        &self,
        span: Span,
        source_file: &SourceFile,
    ) -> Option<String> {
        let line = source_file.line_text(span.start.line)?;
        let spaces = " ".repeat(span.start.column.saturating_sub(1));
        let width = if span.start.line == span.end.line {
            span.end.column.saturating_sub(span.start.column).max(1)
        } else {
            line.chars()
                .count()
                .saturating_sub(span.start.column - 1)
                .max(1)
        };
        let indicators = self.config.indicator.to_string().repeat(width);

        Some(format!(
            "{:>4} | {}\n     | {}{}\n",
            span.start.line,
            line,
            spaces,
            self.paint_error(&indicators)
        ))
    }

    fn paint_error(
        &self,
        text: &str,
    ) -> String {
        if self.config.use_colors {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }
}
