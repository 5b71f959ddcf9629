//! 项目配置 (askrun.toml)
//!
//! 所有字段都有默认值，缺少配置文件时使用默认布局：
//!
//! ```toml
//! [project]
//! python = "python3"
//! venv_dir = ".venv"
//! requirements = "requirements.txt"
//! entry = "ask.py"
//! env_file = ".env"
//! env_template = ".env.example"
//!
//! [clean]
//! dirs = ["__pycache__"]
//! extensions = ["pyc", "pyo"]
//!
//! [secrets]
//! required = ["SEARCH_API_KEY", "SEARCH_PROJECT_KEY", "LLM_API_KEY"]
//! ```

pub mod format;

use crate::error::{AskError, Result};
use crate::utils::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 项目配置文件名
pub const CONFIG_FILE_NAME: &str = "askrun.toml";

/// 虚拟环境就绪标记文件名
pub const STAMP_FILE_NAME: &str = ".askrun-ready";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    /// 创建虚拟环境所用的基础解释器
    pub python: String,
    pub venv_dir: String,
    /// 依赖清单
    pub requirements: String,
    /// 入口脚本
    pub entry: String,
    pub env_file: String,
    pub env_template: String,
}

impl Default for ProjectSection {
    fn default() -> Self {
        let python = if cfg!(target_os = "windows") {
            "python"
        } else {
            "python3"
        };

        Self {
            python: python.to_string(),
            venv_dir: ".venv".to_string(),
            requirements: "requirements.txt".to_string(),
            entry: "ask.py".to_string(),
            env_file: ".env".to_string(),
            env_template: ".env.example".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanSection {
    /// 按目录名整体删除
    pub dirs: Vec<String>,
    /// 按扩展名删除文件（不带点）
    pub extensions: Vec<String>,
}

impl Default for CleanSection {
    fn default() -> Self {
        Self {
            dirs: vec!["__pycache__".to_string()],
            extensions: vec!["pyc".to_string(), "pyo".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsSection {
    /// 入口脚本运行所需的密钥，缺失时只告警
    pub required: Vec<String>,
}

impl Default for SecretsSection {
    fn default() -> Self {
        Self {
            required: vec![
                "SEARCH_API_KEY".to_string(),
                "SEARCH_PROJECT_KEY".to_string(),
                "LLM_API_KEY".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    pub clean: CleanSection,
    pub secrets: SecretsSection,
}

impl ProjectConfig {
    /// 加载配置
    ///
    /// `explicit` 为 `Some` 时文件必须存在；否则尝试 `<root>/askrun.toml`，不存在则使用默认值。
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = config_path(root, explicit);
        if !paths::file_exists(&path) {
            if explicit.is_some() {
                return Err(AskError::FileNotFound(path));
            }
            tracing::debug!("未找到 {}，使用默认配置", path.display());
            return Ok(Self::default());
        }

        tracing::debug!("加载配置: {}", path.display());
        let content = paths::read_file(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// 配置文件位置：`--config` 指定的路径优先，否则为 `<root>/askrun.toml`
pub fn config_path(root: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => root.join(CONFIG_FILE_NAME),
    }
}

/// 项目：根目录 + 配置，负责把相对路径解析到根目录下
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: ProjectConfig,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: ProjectConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// 打开项目目录并加载配置
    pub fn open(root: &Path, explicit_config: Option<&Path>) -> Result<Self> {
        if !root.is_dir() {
            return Err(AskError::FileNotFound(root.to_path_buf()));
        }
        let config = ProjectConfig::load(root, explicit_config)?;
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn python(&self) -> &str {
        &self.config.project.python
    }

    pub fn venv_dir(&self) -> PathBuf {
        self.resolve(&self.config.project.venv_dir)
    }

    /// 虚拟环境内的解释器
    pub fn venv_python(&self) -> PathBuf {
        paths::venv_python(&self.venv_dir())
    }

    pub fn stamp_file(&self) -> PathBuf {
        self.venv_dir().join(STAMP_FILE_NAME)
    }

    pub fn requirements(&self) -> PathBuf {
        self.resolve(&self.config.project.requirements)
    }

    /// 入口脚本按配置原样传参，子进程工作目录为项目根目录
    pub fn entry(&self) -> &str {
        &self.config.project.entry
    }

    pub fn entry_path(&self) -> PathBuf {
        self.resolve(&self.config.project.entry)
    }

    pub fn env_file(&self) -> PathBuf {
        self.resolve(&self.config.project.env_file)
    }

    pub fn env_template(&self) -> PathBuf {
        self.resolve(&self.config.project.env_template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = ProjectConfig::from_toml_str(
            r#"
[project]
entry = "main.py"

[clean]
extensions = ["pyc"]
"#,
        )
        .unwrap();

        assert_eq!(config.project.entry, "main.py");
        assert_eq!(config.project.venv_dir, ".venv");
        assert_eq!(config.clean.dirs, vec!["__pycache__"]);
        assert_eq!(config.clean.extensions, vec!["pyc"]);
        assert_eq!(config.secrets, SecretsSection::default());
    }

    #[test]
    fn test_malformed_config() {
        let result = ProjectConfig::from_toml_str("[project\nentry = ");
        assert!(matches!(result, Err(AskError::ConfigParse(_))));
    }

    #[test]
    fn test_toml_roundtrip_of_defaults() {
        let config = ProjectConfig::default();
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("venv_dir = \".venv\""));
        assert_eq!(ProjectConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_implicit_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProjectConfig::load(dir.path(), None).unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_load_missing_explicit_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("custom.toml");
        let result = ProjectConfig::load(dir.path(), Some(&missing));
        assert!(matches!(result, Err(AskError::FileNotFound(p)) if p == missing));
    }

    #[test]
    fn test_config_path_prefers_explicit() {
        let root = Path::new("project");
        assert_eq!(config_path(root, None), root.join(CONFIG_FILE_NAME));
        assert_eq!(
            config_path(root, Some(Path::new("custom.toml"))),
            PathBuf::from("custom.toml")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_project_paths() {
        let project = Project::new("/work/app", ProjectConfig::default());
        assert_eq!(project.venv_dir(), PathBuf::from("/work/app/.venv"));
        assert_eq!(project.env_file(), PathBuf::from("/work/app/.env"));
        assert_eq!(
            project.stamp_file(),
            PathBuf::from("/work/app/.venv/.askrun-ready")
        );
        assert_eq!(project.entry(), "ask.py");
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_paths_are_kept() {
        let mut config = ProjectConfig::default();
        config.project.venv_dir = "/opt/venvs/ask".to_string();
        let project = Project::new("/work/app", config);
        assert_eq!(project.venv_dir(), PathBuf::from("/opt/venvs/ask"));
        assert_eq!(
            project.venv_python(),
            PathBuf::from("/opt/venvs/ask/bin/python")
        );
    }
}
