//! .env 前置检查与显式初始化

use crate::config::Project;
use crate::error::{AskError, Result};
use crate::types::InitOutcome;
use crate::utils::paths;
use std::path::PathBuf;

/// 检查密钥文件是否存在；缺失时给出指引后失败，不做任何修复
pub fn require_config_file(project: &Project) -> Result<PathBuf> {
    let env_file = project.env_file();
    if paths::file_exists(&env_file) {
        return Ok(env_file);
    }

    Err(AskError::MissingEnvFile {
        env_file,
        template: project.env_template(),
    })
}

/// 从模板复制出密钥文件（init-env 目标）
///
/// 已存在且未指定 `force` 时不做改动。
pub fn init_env_file(project: &Project, force: bool) -> Result<InitOutcome> {
    let env_file = project.env_file();
    let template = project.env_template();

    let existed = paths::file_exists(&env_file);
    if existed && !force {
        tracing::debug!("{} 已存在，跳过", env_file.display());
        return Ok(InitOutcome::AlreadyExists);
    }

    if !paths::file_exists(&template) {
        return Err(AskError::TemplateMissing(template));
    }

    let content = paths::read_file(&template)?;
    paths::write_file_safe(&env_file, &content)?;
    tracing::info!("已从 {} 创建 {}", template.display(), env_file.display());

    Ok(if existed {
        InitOutcome::Overwritten
    } else {
        InitOutcome::Created
    })
}
