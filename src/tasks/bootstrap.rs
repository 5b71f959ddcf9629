//! 虚拟环境准备
//!
//! 就绪标记（`.askrun-ready`）只在依赖全部安装成功后写入，内容为依赖清单的 SHA-256。
//! 标记存在即视为就绪，不会重复安装。

use crate::config::Project;
use crate::error::{AskError, Result};
use crate::types::{BootstrapOutcome, VenvState};
use crate::utils::executor::{ProcessRunner, ProcessSpec};
use crate::utils::paths;
use sha2::{Digest, Sha256};
use std::path::Path;

/// 确保虚拟环境存在并已安装依赖（幂等）
pub fn ensure_environment(
    project: &Project,
    runner: &dyn ProcessRunner,
) -> Result<BootstrapOutcome> {
    let stamp = project.stamp_file();
    if paths::file_exists(&stamp) {
        let state = venv_state(project)?;
        tracing::debug!("虚拟环境 {}: {}", project.venv_dir().display(), state);
        if state == VenvState::Stale {
            tracing::warn!(
                "{} 在安装后已变更，如需重新安装请运行 `askrun clean && askrun setup`",
                project.requirements().display()
            );
        }
        return Ok(BootstrapOutcome::Reused);
    }

    let requirements = project.requirements();
    if !paths::file_exists(&requirements) {
        return Err(AskError::FileNotFound(requirements));
    }

    let venv_dir = project.venv_dir();
    let venv_python = project.venv_python();

    tracing::info!("创建虚拟环境: {}", venv_dir.display());
    run_step(
        runner,
        "创建虚拟环境",
        ProcessSpec::new(project.python())
            .args(["-m", "venv"])
            .arg(&venv_dir)
            .current_dir(project.root()),
    )?;

    tracing::info!("升级 pip");
    run_step(
        runner,
        "升级 pip",
        ProcessSpec::new(&venv_python)
            .args(["-m", "pip", "install", "--upgrade", "pip"])
            .current_dir(project.root()),
    )?;

    tracing::info!("安装依赖: {}", requirements.display());
    run_step(
        runner,
        "安装依赖",
        ProcessSpec::new(&venv_python)
            .args(["-m", "pip", "install", "-r"])
            .arg(&requirements)
            .current_dir(project.root()),
    )?;

    let digest = manifest_digest(&requirements)?;
    paths::write_file_safe(&stamp, &format!("{}\n", digest))?;
    tracing::info!("虚拟环境准备完成");

    Ok(BootstrapOutcome::Created)
}

/// 读取虚拟环境状态（只读）
pub fn venv_state(project: &Project) -> Result<VenvState> {
    if !project.venv_dir().is_dir() {
        return Ok(VenvState::Absent);
    }

    let stamp = project.stamp_file();
    if !paths::file_exists(&stamp) {
        return Ok(VenvState::Incomplete);
    }

    let requirements = project.requirements();
    if !paths::file_exists(&requirements) {
        return Ok(VenvState::Ready);
    }

    let recorded = paths::read_file(&stamp)?;
    if recorded.trim() == manifest_digest(&requirements)? {
        Ok(VenvState::Ready)
    } else {
        Ok(VenvState::Stale)
    }
}

/// 依赖清单指纹
pub fn manifest_digest(path: &Path) -> Result<String> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

fn run_step(runner: &dyn ProcessRunner, step: &str, spec: ProcessSpec) -> Result<()> {
    let code = runner.run(&spec)?;
    if code != 0 {
        return Err(AskError::BootstrapFailed {
            step: step.to_string(),
            code,
        });
    }
    Ok(())
}
