//! 参数组装与入口脚本调用
//!
//! 入口脚本参数约定：`-q <query> [-d <n>] [-s <site>] [-m <model>] -l <level>`。
//! QUERY 与 LOG_LEVEL 总是传递；其余变量为空字符串时整个参数省略，而不是传空值。

use crate::config::Project;
use crate::config::format::dotenv::DotenvParser;
use crate::error::Result;
use crate::types::{LOG_LEVEL_CHOICES, RunVars, VarName};
use crate::utils::executor::{ProcessRunner, ProcessSpec};
use std::collections::BTreeMap;

/// 组装入口脚本参数
pub fn assemble_args(vars: &RunVars) -> Vec<String> {
    let mut args = Vec::new();

    for name in VarName::ALL {
        let value = vars.get(name);
        if name.always_passed() || !value.is_empty() {
            args.push(name.flag().to_string());
            args.push(value.to_string());
        }
    }

    args
}

/// 对取值做提示性检查，只返回告警文本，不修改或拒绝取值
pub fn advisories(vars: &RunVars) -> Vec<String> {
    let mut warnings = Vec::new();

    if !LOG_LEVEL_CHOICES
        .iter()
        .any(|level| level.eq_ignore_ascii_case(&vars.log_level))
    {
        warnings.push(format!(
            "LOG_LEVEL '{}' 不在 {} 之中",
            vars.log_level,
            LOG_LEVEL_CHOICES.join("/")
        ));
    }

    if !vars.date_restrict.is_empty() && vars.date_restrict.parse::<i64>().is_err() {
        warnings.push(format!(
            "DATE_RESTRICT '{}' 不是整数",
            vars.date_restrict
        ));
    }

    warnings
}

/// 读取密钥文件
pub fn load_secrets(project: &Project) -> Result<BTreeMap<String, String>> {
    let vars = DotenvParser::parse_file(&project.env_file())?;
    tracing::debug!("从 {} 加载 {} 个变量", project.env_file().display(), vars.len());
    // 同名键后出现者覆盖先出现者
    Ok(vars.into_iter().collect())
}

/// 合并后的环境中缺失（或为空）的必需密钥
///
/// `inherited` 查询父进程环境，便于测试替换。
pub fn missing_secrets<F>(
    project: &Project,
    secrets: &BTreeMap<String, String>,
    inherited: F,
) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    project
        .config()
        .secrets
        .required
        .iter()
        .filter(|key| {
            let value = secrets.get(key.as_str()).cloned().or_else(|| inherited(key.as_str()));
            value.map(|v| v.is_empty()).unwrap_or(true)
        })
        .cloned()
        .collect()
}

/// 构造调用描述：虚拟环境解释器 + 入口脚本 + 参数，密钥覆盖继承的同名变量
pub fn build_spec(
    project: &Project,
    vars: &RunVars,
    secrets: BTreeMap<String, String>,
) -> ProcessSpec {
    ProcessSpec::new(project.venv_python())
        .arg(project.entry())
        .args(assemble_args(vars))
        .current_dir(project.root())
        .envs(secrets)
}

/// 调用入口脚本，返回其退出码
pub fn invoke(project: &Project, vars: &RunVars, runner: &dyn ProcessRunner) -> Result<i32> {
    for warning in advisories(vars) {
        tracing::warn!("{}", warning);
    }

    let secrets = load_secrets(project)?;
    for key in missing_secrets(project, &secrets, |k| std::env::var(k).ok()) {
        tracing::warn!("未设置 {}，入口脚本可能会失败", key);
    }

    let spec = build_spec(project, vars, secrets);
    tracing::info!("运行: {}", spec.command_line());

    let code = runner.run(&spec)?;
    if code != 0 {
        tracing::debug!("入口脚本退出码: {}", code);
    }
    Ok(code)
}
