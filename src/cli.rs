//! CLI 参数定义

use crate::error::Result;
use crate::types::{RunVars, VarName};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// askrun - Python 入口脚本的任务运行器
#[derive(Parser, Debug)]
#[command(
    name = "askrun",
    version,
    about = "准备虚拟环境并运行 ask.py",
    long_about = "创建并复用隔离的 Python 虚拟环境，加载 .env 中的密钥，\n按 QUERY/DATE_RESTRICT/TARGET_SITE/MODEL_NAME/LOG_LEVEL 组装参数后调用入口脚本。\n不指定子命令时等同于 run。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 详细输出模式
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 项目目录
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// 配置文件路径（默认 <项目目录>/askrun.toml，可缺省）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 准备环境并运行入口脚本（默认目标）
    #[command(visible_alias = "all")]
    Run(RunArgs),

    /// 创建虚拟环境并安装依赖
    Setup,

    /// 删除虚拟环境和编译产物
    Clean,

    /// 从 .env.example 创建 .env
    InitEnv {
        /// 覆盖已存在的 .env
        #[arg(short, long)]
        force: bool,
    },

    /// 诊断项目状态
    Doctor,

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommands),
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run(RunArgs::default())
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// 显示生效的配置
    Show {
        /// 输出格式 (toml/json)
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// 写入默认配置文件
    Init {
        #[arg(short, long)]
        force: bool,
    },
}

/// run 的变量覆盖
///
/// 优先级（从低到高）：默认值 → 同名环境变量 → 命令行参数 → `NAME=VALUE` 赋值
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// 查询内容 (QUERY)
    #[arg(short, long)]
    pub query: Option<String>,

    /// 限制结果的时间范围 (DATE_RESTRICT)
    #[arg(short, long)]
    pub date_restrict: Option<String>,

    /// 限制结果的站点 (TARGET_SITE)
    #[arg(short = 's', long)]
    pub target_site: Option<String>,

    /// 推理模型名称 (MODEL_NAME)
    #[arg(short, long)]
    pub model_name: Option<String>,

    /// 入口脚本日志级别 (LOG_LEVEL)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 只打印将要执行的命令
    #[arg(long)]
    pub dry_run: bool,

    /// make 风格的变量赋值，如 QUERY="..." TARGET_SITE=example.com
    #[arg(value_name = "NAME=VALUE")]
    pub assignments: Vec<String>,
}

impl RunArgs {
    /// 从进程环境解析变量
    pub fn resolve(&self) -> Result<RunVars> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// 解析变量，`lookup` 提供同名环境变量
    pub fn resolve_with<F>(&self, lookup: F) -> Result<RunVars>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut vars = RunVars::default();

        for name in VarName::ALL {
            if let Some(value) = lookup(name.as_str()) {
                vars.set(name, value);
            }
        }

        let flags = [
            (VarName::Query, &self.query),
            (VarName::DateRestrict, &self.date_restrict),
            (VarName::TargetSite, &self.target_site),
            (VarName::ModelName, &self.model_name),
            (VarName::LogLevel, &self.log_level),
        ];
        for (name, value) in flags {
            if let Some(value) = value {
                vars.set(name, value.clone());
            }
        }

        for assignment in &self.assignments {
            let name = vars.apply_assignment(assignment)?;
            tracing::debug!("{} 由命令行赋值覆盖", name);
        }

        Ok(vars)
    }
}
