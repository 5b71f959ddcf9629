//! 错误处理模块 (修复原则：明确抛出异常)

use std::error::Error;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AskError {
    #[error("文件IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("目录遍历错误: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("配置文件解析错误: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("配置序列化错误: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("JSON序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("文件不存在: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error(
        "缺少 {} 文件。请先运行 `askrun init-env` 从 {} 复制一份，并填写其中的 API 密钥",
        .env_file.display(),
        .template.display()
    )]
    MissingEnvFile { env_file: PathBuf, template: PathBuf },

    #[error("模板文件不存在: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("无效的变量赋值 '{0}'，应为 NAME=VALUE (可用: QUERY, DATE_RESTRICT, TARGET_SITE, MODEL_NAME, LOG_LEVEL)")]
    InvalidOverride(String),

    #[error("环境文件解析错误: {0}")]
    EnvParse(String),

    #[error("命令未找到: {0}")]
    CommandNotFound(String),

    #[error("环境准备失败: {step} (退出码 {code})")]
    BootstrapFailed { step: String, code: i32 },
}

impl AskError {
    /// 报告错误，支持详细/安静模式
    /// verbose = true: 详细错误链
    /// verbose = false: 关键信息
    pub fn report(&self, verbose: bool) {
        if verbose {
            eprintln!("❌ 错误: {}", self);

            if let Some(source) = self.source() {
                eprintln!("  └─ 原因: {}", source);
                let mut current = source.source();
                while let Some(next) = current {
                    eprintln!("     └─ {}", next);
                    current = next.source();
                }
            }
        } else {
            match self {
                AskError::MissingEnvFile { .. } => eprintln!("{}", self),
                AskError::FileNotFound(path) => eprintln!("文件不存在: {}", path.display()),
                AskError::Io(err) => eprintln!("文件错误: {}", err),
                _ => eprintln!("错误: {}", self),
            }
        }
    }
}

/// 简化 Result 类型别名
pub type Result<T> = std::result::Result<T, AskError>;
