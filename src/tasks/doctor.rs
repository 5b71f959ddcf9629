//! 项目健康诊断（只读）

use crate::config::Project;
use crate::config::format::dotenv::DotenvParser;
use crate::error::Result;
use crate::types::VenvState;
use crate::utils::executor::{ProcessRunner, ProcessSpec};
use crate::utils::paths;
use std::collections::BTreeMap;
use std::fmt;

use super::bootstrap::venv_state;
use super::invoke::missing_secrets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub status: CheckStatus,
    pub label: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    pub checks: Vec<Check>,
}

impl DoctorReport {
    fn push(&mut self, status: CheckStatus, label: &str, detail: impl Into<String>) {
        self.checks.push(Check {
            status,
            label: label.to_string(),
            detail: detail.into(),
        });
    }

    pub fn issues(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    pub fn warnings(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    pub fn find(&self, label: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.label == label)
    }
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "🔍 askrun 健康诊断\n")?;
        for check in &self.checks {
            let mark = match check.status {
                CheckStatus::Ok => "✓",
                CheckStatus::Warn => "⚠️ ",
                CheckStatus::Fail => "❌",
            };
            writeln!(f, "   {} {}: {}", mark, check.label, check.detail)?;
        }
        writeln!(f, "\n──────────────────────────────────────────────")?;

        let (issues, warnings) = (self.issues(), self.warnings());
        if issues == 0 && warnings == 0 {
            write!(f, "✅ 所有检查通过")
        } else {
            write!(f, "发现 {} 个问题，{} 个警告", issues, warnings)
        }
    }
}

/// 诊断项目状态，不修改任何文件
pub fn diagnose(project: &Project, runner: &dyn ProcessRunner) -> Result<DoctorReport> {
    let mut report = DoctorReport::default();

    report.push(
        CheckStatus::Ok,
        "项目目录",
        project.root().display().to_string(),
    );

    file_check(&mut report, "入口脚本", &project.entry_path(), CheckStatus::Fail);
    file_check(
        &mut report,
        "依赖清单",
        &project.requirements(),
        CheckStatus::Fail,
    );

    // 基础解释器只在需要创建虚拟环境时使用
    match runner.capture(&ProcessSpec::new(project.python()).arg("--version")) {
        Ok((0, version)) => report.push(CheckStatus::Ok, "Python", version),
        Ok((code, output)) => report.push(
            CheckStatus::Fail,
            "Python",
            format!("{} --version 退出码 {}: {}", project.python(), code, output),
        ),
        Err(e) => report.push(CheckStatus::Fail, "Python", e.to_string()),
    }

    let venv_dir = project.venv_dir();
    match venv_state(project)? {
        VenvState::Ready => report.push(CheckStatus::Ok, "虚拟环境", venv_dir.display().to_string()),
        VenvState::Absent => report.push(
            CheckStatus::Warn,
            "虚拟环境",
            "不存在，首次运行时自动创建",
        ),
        VenvState::Incomplete => report.push(
            CheckStatus::Warn,
            "虚拟环境",
            "未完成安装，下次运行时会重新安装依赖",
        ),
        VenvState::Stale => report.push(
            CheckStatus::Warn,
            "虚拟环境",
            "依赖清单已变更，运行 `askrun clean && askrun setup` 重建",
        ),
    }

    file_check(
        &mut report,
        "模板文件",
        &project.env_template(),
        CheckStatus::Warn,
    );

    let env_file = project.env_file();
    if paths::file_exists(&env_file) {
        report.push(CheckStatus::Ok, "密钥文件", env_file.display().to_string());
        secrets_check(&mut report, project)?;
    } else {
        report.push(
            CheckStatus::Fail,
            "密钥文件",
            format!("{} 不存在，运行 `askrun init-env` 创建", env_file.display()),
        );
    }

    Ok(report)
}

fn file_check(
    report: &mut DoctorReport,
    label: &str,
    path: &std::path::Path,
    missing: CheckStatus,
) {
    if paths::file_exists(path) {
        report.push(CheckStatus::Ok, label, path.display().to_string());
    } else {
        report.push(missing, label, format!("{} 不存在", path.display()));
    }
}

fn secrets_check(report: &mut DoctorReport, project: &Project) -> Result<()> {
    let secrets: BTreeMap<String, String> = match DotenvParser::parse_file(&project.env_file()) {
        Ok(vars) => vars.into_iter().collect(),
        Err(e) => {
            report.push(CheckStatus::Fail, "密钥内容", e.to_string());
            return Ok(());
        }
    };

    // 与 run 一致：.env 之外也接受父进程环境中的同名变量
    let missing = missing_secrets(project, &secrets, |key| std::env::var(key).ok());

    if missing.is_empty() {
        report.push(
            CheckStatus::Ok,
            "密钥内容",
            format!("{} 个必需密钥均已填写", project.config().secrets.required.len()),
        );
    } else {
        report.push(
            CheckStatus::Warn,
            "密钥内容",
            format!("未填写: {}", missing.join(", ")),
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{EnvGuard, ProjectFixture, RecordingRunner};
    use serial_test::serial;

    const REQUIRED: [&str; 3] = ["SEARCH_API_KEY", "SEARCH_PROJECT_KEY", "LLM_API_KEY"];

    #[test]
    #[serial]
    fn test_healthy_project() {
        let fixture = ProjectFixture::new();
        fixture.write("ask.py", "");
        fixture.write("requirements.txt", "requests\n");
        fixture.write(".env.example", "SEARCH_API_KEY=\n");
        fixture.write(
            ".env",
            "SEARCH_API_KEY=a\nSEARCH_PROJECT_KEY=b\nLLM_API_KEY=c\n",
        );
        let project = fixture.project();
        let runner = RecordingRunner::new();
        crate::tasks::bootstrap::ensure_environment(&project, &runner).unwrap();

        let report = diagnose(&project, &runner).unwrap();
        assert_eq!(report.issues(), 0, "{}", report);
        assert_eq!(report.warnings(), 0, "{}", report);
        assert!(report.to_string().contains("所有检查通过"));
    }

    #[test]
    #[serial]
    fn test_reports_missing_pieces() {
        let guard = EnvGuard::new();
        for key in REQUIRED {
            guard.remove_var(key);
        }
        let fixture = ProjectFixture::new();
        fixture.write(".env", "SEARCH_API_KEY=a\n");
        let runner = RecordingRunner::new();

        let report = diagnose(&fixture.project(), &runner).unwrap();
        assert_eq!(report.find("入口脚本").unwrap().status, CheckStatus::Fail);
        assert_eq!(report.find("虚拟环境").unwrap().status, CheckStatus::Warn);

        let secrets = report.find("密钥内容").unwrap();
        assert_eq!(secrets.status, CheckStatus::Warn);
        assert!(secrets.detail.contains("LLM_API_KEY"));
        assert!(!secrets.detail.contains("SEARCH_API_KEY"));
    }

    #[test]
    #[serial]
    fn test_secrets_from_shell_environment() {
        let guard = EnvGuard::new();
        for key in REQUIRED {
            guard.set_var(key, "from-shell");
        }
        let fixture = ProjectFixture::new();
        fixture.write(".env", "LLM_BASE_URL=x\n");
        let runner = RecordingRunner::new();

        let report = diagnose(&fixture.project(), &runner).unwrap();
        let secrets = report.find("密钥内容").unwrap();
        assert_eq!(secrets.status, CheckStatus::Ok, "{}", secrets.detail);

        // .env 中的空值不会被 shell 中的同名变量补上
        fixture.write(".env", "LLM_API_KEY=\n");
        let report = diagnose(&fixture.project(), &runner).unwrap();
        let secrets = report.find("密钥内容").unwrap();
        assert_eq!(secrets.status, CheckStatus::Warn);
        assert_eq!(secrets.detail, "未填写: LLM_API_KEY");
    }

    #[test]
    fn test_missing_env_file_and_python() {
        let fixture = ProjectFixture::new();
        let runner = RecordingRunner::with_codes([127]);

        let report = diagnose(&fixture.project(), &runner).unwrap();
        assert_eq!(report.find("Python").unwrap().status, CheckStatus::Fail);
        assert_eq!(report.find("密钥文件").unwrap().status, CheckStatus::Fail);
        assert!(report.find("密钥内容").is_none());
        // 诊断不创建任何文件
        assert!(!fixture.path().join(".env").exists());
        assert!(!fixture.path().join(".venv").exists());
    }
}
