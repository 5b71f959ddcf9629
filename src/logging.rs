//! 日志初始化
//!
//! 默认只输出 warn 及以上（安静模式），--verbose 打开 debug，RUST_LOG 优先于两者。
//! 日志写到 stderr，stdout 留给入口脚本。

use tracing_subscriber::{EnvFilter, prelude::*};

pub fn init_tracing(verbose: bool) {
    let level = if verbose { "askrun=debug" } else { "askrun=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}
