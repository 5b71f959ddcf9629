//! 清理虚拟环境和编译产物（无条件、幂等）

use crate::config::Project;
use crate::error::Result;
use crate::types::CleanReport;
use crate::utils::paths;
use std::path::PathBuf;
use walkdir::WalkDir;

/// 删除虚拟环境目录以及项目内匹配的编译产物
pub fn clean(project: &Project) -> Result<CleanReport> {
    let mut report = CleanReport::default();

    let venv_dir = project.venv_dir();
    report.venv_removed = paths::remove_dir_if_exists(&venv_dir)?;
    if report.venv_removed {
        tracing::info!("已删除虚拟环境: {}", venv_dir.display());
    }

    let (dirs, files) = find_artifacts(project)?;

    for dir in &dirs {
        if paths::remove_dir_if_exists(dir)? {
            tracing::debug!("删除目录: {}", dir.display());
            report.dirs_removed += 1;
        }
    }

    for file in &files {
        match std::fs::remove_file(file) {
            Ok(()) => {
                tracing::debug!("删除文件: {}", file.display());
                report.files_removed += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}

/// 收集待删除的产物目录和文件；匹配的目录整体删除，不再深入
fn find_artifacts(project: &Project) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let clean = &project.config().clean;
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    let mut walker = WalkDir::new(project.root()).min_depth(1).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy();

        if entry.file_type().is_dir() {
            if clean.dirs.iter().any(|d| *d == name) {
                dirs.push(entry.path().to_path_buf());
                walker.skip_current_dir();
            }
            continue;
        }

        let matches_ext = entry
            .path()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                clean.extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false);

        if matches_ext {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok((dirs, files))
}
