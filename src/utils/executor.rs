//! 跨平台命令执行器
//!
//! 所有子进程调用都经过 `ProcessRunner`，便于测试时替换为记录型实现。
//! 子进程继承父进程的环境变量和 stdin/stdout/stderr，`ProcessSpec::env` 中的变量覆盖继承值。

use crate::error::{AskError, Result};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// 一次子进程调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: PathBuf,
    /// 参数按 OsString 保存，路径不经过 UTF-8 转换
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    /// 叠加到继承环境之上的变量
    pub env: BTreeMap<String, String>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn envs(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(vars);
        self
    }

    /// 参数的文本形式，仅用于展示和断言
    pub fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    /// 用于展示的命令行（含必要的引号）
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.display_args())
            .map(|part| shell_quote(&part))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.envs(&self.env);
        cmd
    }
}

/// 子进程执行接口
pub trait ProcessRunner {
    /// 继承标准流执行并等待，返回退出码
    fn run(&self, spec: &ProcessSpec) -> Result<i32>;

    /// 捕获输出执行，返回退出码和合并后的 stdout/stderr
    fn capture(&self, spec: &ProcessSpec) -> Result<(i32, String)>;
}

/// 真实的系统进程执行器
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, spec: &ProcessSpec) -> Result<i32> {
        tracing::debug!("执行: {}", spec.command_line());

        let mut cmd = spec.to_command();
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let status = cmd.status().map_err(|e| spawn_error(&spec.program, e))?;
        Ok(exit_code(status))
    }

    fn capture(&self, spec: &ProcessSpec) -> Result<(i32, String)> {
        tracing::debug!("探测: {}", spec.command_line());

        let output = spec
            .to_command()
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(&spec.program, e))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok((exit_code(output.status), text.trim().to_string()))
    }
}

fn spawn_error(program: &Path, e: std::io::Error) -> AskError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AskError::CommandNotFound(format!(
            "{}: {} (请确保命令在 PATH 中或使用完整路径)",
            program.display(),
            e
        ))
    } else {
        AskError::Io(e)
    }
}

/// 退出码；Unix 上被信号终止的进程映射为 128 + 信号值
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

fn shell_quote(part: &str) -> String {
    let plain = !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if plain {
        return part.to_string();
    }

    let mut quoted = String::with_capacity(part.len() + 2);
    quoted.push('"');
    for c in part.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_quoting() {
        let spec = ProcessSpec::new("python")
            .arg("ask.py")
            .args(["-q", "What is an LLM agent?", "-l", "INFO"]);
        assert_eq!(
            spec.command_line(),
            r#"python ask.py -q "What is an LLM agent?" -l INFO"#
        );
    }

    #[test]
    fn test_command_line_escapes() {
        let spec = ProcessSpec::new("p").args(["", "say \"hi\" $HOME"]);
        assert_eq!(spec.command_line(), r#"p "" "say \"hi\" \$HOME""#);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_argument_is_preserved() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"/work/caf\xe9/.venv");
        let spec = ProcessSpec::new("python").args(["-m", "venv"]).arg(raw);
        assert_eq!(spec.args[2].as_os_str(), raw);
        assert_eq!(spec.to_command().get_args().nth(2), Some(raw));
    }

    #[test]
    fn test_missing_program_is_command_not_found() {
        let spec = ProcessSpec::new("askrun-definitely-missing-binary");
        let result = SystemRunner.run(&spec);
        assert!(matches!(result, Err(AskError::CommandNotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_and_env_overlay() {
        let spec = ProcessSpec::new("sh")
            .args(["-c", "test \"$ASKRUN_TEST_OVERLAY\" = yes && exit 7"])
            .envs([("ASKRUN_TEST_OVERLAY".to_string(), "yes".to_string())]);
        assert_eq!(SystemRunner.run(&spec).unwrap(), 7);
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_merges_streams() {
        let spec = ProcessSpec::new("sh").args(["-c", "echo out; echo err 1>&2"]);
        let (code, text) = SystemRunner.capture(&spec).unwrap();
        assert_eq!(code, 0);
        assert!(text.contains("out"));
        assert!(text.contains("err"));
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_exit_code() {
        let spec = ProcessSpec::new("sh").args(["-c", "kill -TERM $$"]);
        assert_eq!(SystemRunner.run(&spec).unwrap(), 128 + 15);
    }
}
