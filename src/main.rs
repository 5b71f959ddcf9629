//! askrun 主程序入口
//!
//! 设计原则：
//! - 模块化：入口代码简洁，逻辑委托给各模块
//! - 安静模式：默认只输出结果，日志通过 --verbose 打开
//! - 退出码：askrun 自身失败为 1，run 透传入口脚本的退出码

use askrun::cli::{Cli, Commands, ConfigCommands};
use askrun::config::{self, Project, ProjectConfig};
use askrun::error::Result;
use askrun::tasks::TaskRunner;
use askrun::types::{BootstrapOutcome, InitOutcome, OutputFormat};
use askrun::utils::executor::SystemRunner;
use askrun::utils::paths;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    askrun::logging::init_tracing(cli.verbose);

    let verbose = cli.verbose;
    match run_command(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            e.report(verbose);
            std::process::exit(1);
        }
    }
}

/// 运行具体命令，返回进程退出码
fn run_command(cli: Cli) -> Result<i32> {
    let verbose = cli.verbose;
    // config init 不依赖现有配置文件能否解析，其余命令在各自分支中打开项目
    let open_project = || Project::open(&cli.project_dir, cli.config.as_deref());

    match cli.command.unwrap_or_default() {
        Commands::Run(args) => {
            let project = open_project()?;
            let tasks = TaskRunner::new(&project, &SystemRunner);
            let vars = args.resolve()?;
            if args.dry_run {
                println!("{}", tasks.dry_run(&vars)?);
                return Ok(0);
            }
            return tasks.run(&vars);
        }

        Commands::Setup => {
            let project = open_project()?;
            match TaskRunner::new(&project, &SystemRunner).setup()? {
                BootstrapOutcome::Created => {
                    println!("✓ 虚拟环境已创建: {}", project.venv_dir().display())
                }
                BootstrapOutcome::Reused => {
                    if verbose {
                        println!("○ 虚拟环境已存在: {}", project.venv_dir().display());
                    }
                }
            }
        }

        Commands::Clean => {
            let project = open_project()?;
            let report = TaskRunner::new(&project, &SystemRunner).clean()?;
            if report.is_empty() {
                if verbose {
                    println!("○ 无需清理");
                }
            } else {
                if report.venv_removed {
                    println!("✓ 已删除虚拟环境: {}", project.venv_dir().display());
                }
                println!(
                    "✓ 已删除 {} 个缓存目录，{} 个编译文件",
                    report.dirs_removed, report.files_removed
                );
            }
        }

        Commands::InitEnv { force } => {
            let project = open_project()?;
            let env_file = project.env_file();
            match TaskRunner::new(&project, &SystemRunner).init_env(force)? {
                InitOutcome::Created => {
                    println!("✓ 已创建 {}，请填写其中的 API 密钥", env_file.display())
                }
                InitOutcome::Overwritten => {
                    println!("✓ 已用模板覆盖 {}", env_file.display())
                }
                InitOutcome::AlreadyExists => {
                    println!("○ {} 已存在，未做修改 (使用 --force 覆盖)", env_file.display())
                }
            }
        }

        Commands::Doctor => {
            let project = open_project()?;
            let report = TaskRunner::new(&project, &SystemRunner).doctor()?;
            println!("{}", report);
            if !verbose && (report.issues() > 0 || report.warnings() > 0) {
                println!("提示：使用 --verbose 查看详细日志");
            }
        }

        Commands::Config(ConfigCommands::Show { format }) => {
            let project = open_project()?;
            let config = project.config();
            match OutputFormat::from(format.as_str()) {
                OutputFormat::Toml => print!("{}", config.to_toml_string()?),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            }
        }

        Commands::Config(ConfigCommands::Init { force }) => {
            init_config(&cli.project_dir, cli.config.as_deref(), force)?;
        }
    }

    Ok(0)
}

/// 写入默认配置文件，`--config` 指定时写到该路径
fn init_config(
    project_dir: &std::path::Path,
    explicit: Option<&std::path::Path>,
    force: bool,
) -> Result<()> {
    let path = config::config_path(project_dir, explicit);
    if paths::file_exists(&path) && !force {
        println!("○ 配置文件已存在: {} (使用 --force 覆盖)", path.display());
        return Ok(());
    }

    let content = ProjectConfig::default().to_toml_string()?;
    paths::write_file_safe(&path, &content)?;
    println!("✓ 配置文件: {}", path.display());
    Ok(())
}
