//! askrun - Python 入口脚本的任务运行器
//!
//! 准备隔离的虚拟环境、检查并加载 .env、组装参数后调用入口脚本，以及清理生成的产物。

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod tasks;
pub mod types;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

// 重新导出常用类型
pub use config::{Project, ProjectConfig};
pub use error::{AskError, Result};
pub use types::{RunVars, VarName};
