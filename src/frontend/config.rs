//! 编译配置
//!
//! 管理编译器配置选项：模块名、入口函数名、重复声明策略与内置函数注册。
//! 所有字段都有默认值，JSON 配置文件可以只写需要覆盖的字段。

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// 编译配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileConfig {
    /// 生成的 IR 模块名
    #[serde(default = "default_module_name")]
    pub module_name: String,

    /// 顶层代码生成的入口函数名
    #[serde(default = "default_entry_name")]
    pub entry_name: String,

    /// 同一作用域重复声明时报错（默认后声明覆盖先声明）
    #[serde(default)]
    pub strict_redeclaration: bool,

    /// 解析前向根作用域注册 print / println / input
    #[serde(default = "default_true")]
    pub register_builtins: bool,
}

fn default_module_name() -> String {
    "sapling".to_string()
}

fn default_entry_name() -> String {
    "main".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            module_name: default_module_name(),
            entry_name: default_entry_name(),
            strict_redeclaration: false,
            register_builtins: true,
        }
    }
}

impl CompileConfig {
    /// 从 JSON 文件加载配置
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// 设置模块名
    pub fn with_module_name(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.module_name = name.into();
        self
    }

    /// 启用严格重复声明检查
    pub fn with_strict_redeclaration(
        mut self,
        strict: bool,
    ) -> Self {
        self.strict_redeclaration = strict;
        self
    }
}
