//! 任务编排
//!
//! run 的前置链：密钥文件检查 → 虚拟环境准备 → 组装参数并调用。
//! 任一步失败立即终止，不回滚。密钥文件检查放在最前，缺失时不会改动文件系统。

pub mod bootstrap;
pub mod clean;
pub mod doctor;
pub mod guard;
pub mod invoke;

use crate::config::Project;
use crate::error::Result;
use crate::types::{BootstrapOutcome, CleanReport, InitOutcome, RunVars};
use crate::utils::executor::ProcessRunner;

/// 任务执行器
pub struct TaskRunner<'a> {
    project: &'a Project,
    runner: &'a dyn ProcessRunner,
}

impl<'a> TaskRunner<'a> {
    pub fn new(project: &'a Project, runner: &'a dyn ProcessRunner) -> Self {
        Self { project, runner }
    }

    /// setup 目标
    pub fn setup(&self) -> Result<BootstrapOutcome> {
        bootstrap::ensure_environment(self.project, self.runner)
    }

    /// run 目标，返回入口脚本的退出码
    pub fn run(&self, vars: &RunVars) -> Result<i32> {
        guard::require_config_file(self.project)?;
        self.setup()?;
        invoke::invoke(self.project, vars, self.runner)
    }

    /// 只检查并返回将要执行的命令行
    pub fn dry_run(&self, vars: &RunVars) -> Result<String> {
        guard::require_config_file(self.project)?;
        for warning in invoke::advisories(vars) {
            tracing::warn!("{}", warning);
        }
        let spec = invoke::build_spec(self.project, vars, Default::default());
        Ok(spec.command_line())
    }

    pub fn init_env(&self, force: bool) -> Result<InitOutcome> {
        guard::init_env_file(self.project, force)
    }

    pub fn clean(&self) -> Result<CleanReport> {
        clean::clean(self.project)
    }

    pub fn doctor(&self) -> Result<doctor::DoctorReport> {
        doctor::diagnose(self.project, self.runner)
    }
}
