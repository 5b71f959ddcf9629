//! 核心数据结构定义 (表达原则：用数据结构表达逻辑)

use crate::error::{AskError, Result};
use std::fmt;

/// QUERY 默认值
pub const DEFAULT_QUERY: &str = "What is an LLM agent?";

/// LOG_LEVEL 默认值
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// 入口脚本接受的日志级别 (大小写不敏感)
pub const LOG_LEVEL_CHOICES: [&str; 4] = ["DEBUG", "INFO", "WARNING", "ERROR"];

/// 配置变量名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarName {
    Query,
    DateRestrict,
    TargetSite,
    ModelName,
    LogLevel,
}

impl VarName {
    /// 按传参顺序排列
    pub const ALL: [VarName; 5] = [
        VarName::Query,
        VarName::DateRestrict,
        VarName::TargetSite,
        VarName::ModelName,
        VarName::LogLevel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VarName::Query => "QUERY",
            VarName::DateRestrict => "DATE_RESTRICT",
            VarName::TargetSite => "TARGET_SITE",
            VarName::ModelName => "MODEL_NAME",
            VarName::LogLevel => "LOG_LEVEL",
        }
    }

    /// 从字符串转换
    pub fn parse(s: &str) -> Option<Self> {
        VarName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// 入口脚本对应的短参数
    pub fn flag(&self) -> &'static str {
        match self {
            VarName::Query => "-q",
            VarName::DateRestrict => "-d",
            VarName::TargetSite => "-s",
            VarName::ModelName => "-m",
            VarName::LogLevel => "-l",
        }
    }

    /// 未被覆盖时的取值
    pub fn default_value(&self) -> &'static str {
        match self {
            VarName::Query => DEFAULT_QUERY,
            VarName::LogLevel => DEFAULT_LOG_LEVEL,
            _ => "",
        }
    }

    /// 是否无论取值都传给入口脚本
    pub fn always_passed(&self) -> bool {
        matches!(self, VarName::Query | VarName::LogLevel)
    }
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次调用解析出的配置变量，不做持久化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunVars {
    pub query: String,
    pub date_restrict: String,
    pub target_site: String,
    pub model_name: String,
    pub log_level: String,
}

impl Default for RunVars {
    fn default() -> Self {
        let value = |name: VarName| name.default_value().to_string();
        Self {
            query: value(VarName::Query),
            date_restrict: value(VarName::DateRestrict),
            target_site: value(VarName::TargetSite),
            model_name: value(VarName::ModelName),
            log_level: value(VarName::LogLevel),
        }
    }
}

impl RunVars {
    pub fn get(&self, name: VarName) -> &str {
        match name {
            VarName::Query => &self.query,
            VarName::DateRestrict => &self.date_restrict,
            VarName::TargetSite => &self.target_site,
            VarName::ModelName => &self.model_name,
            VarName::LogLevel => &self.log_level,
        }
    }

    pub fn set(&mut self, name: VarName, value: impl Into<String>) {
        let value = value.into();
        match name {
            VarName::Query => self.query = value,
            VarName::DateRestrict => self.date_restrict = value,
            VarName::TargetSite => self.target_site = value,
            VarName::ModelName => self.model_name = value,
            VarName::LogLevel => self.log_level = value,
        }
    }

    /// 应用 make 风格的赋值 `NAME=VALUE`
    ///
    /// 值原样保留（包括空字符串），名称不区分大小写。
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<VarName> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| AskError::InvalidOverride(assignment.to_string()))?;

        let name =
            VarName::parse(name).ok_or_else(|| AskError::InvalidOverride(assignment.to_string()))?;

        self.set(name, value);
        Ok(name)
    }
}

/// 虚拟环境状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenvState {
    /// 目录不存在
    Absent,
    /// 目录存在但未写入就绪标记（上次安装中断或由其他工具创建）
    Incomplete,
    /// 就绪，依赖清单未变更
    Ready,
    /// 就绪，但依赖清单在安装后发生了变化
    Stale,
}

impl fmt::Display for VenvState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VenvState::Absent => write!(f, "absent"),
            VenvState::Incomplete => write!(f, "incomplete"),
            VenvState::Ready => write!(f, "ready"),
            VenvState::Stale => write!(f, "stale"),
        }
    }
}

/// 环境准备结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created,
    Reused,
}

/// init-env 结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    Overwritten,
    AlreadyExists,
}

/// 清理统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub venv_removed: bool,
    pub dirs_removed: usize,
    pub files_removed: usize,
}

impl CleanReport {
    pub fn is_empty(&self) -> bool {
        !self.venv_removed && self.dirs_removed == 0 && self.files_removed == 0
    }
}

/// 输出格式类型
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Toml,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" | "j" => OutputFormat::Json,
            _ => OutputFormat::Toml,
        }
    }
}
