//! 测试工具模块
//!
//! 提供临时项目目录、记录型进程执行器和环境变量守卫

use crate::config::{Project, ProjectConfig};
use crate::error::Result;
use crate::utils::executor::{ProcessRunner, ProcessSpec};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::env;
use std::path::Path;
use tempfile::TempDir;

/// 临时项目目录
pub struct ProjectFixture {
    temp_dir: TempDir,
}

impl Default for ProjectFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// 写入相对路径文件，自动创建父目录
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.path().join(rel)).unwrap()
    }

    /// 使用默认配置的项目
    pub fn project(&self) -> Project {
        self.project_with(ProjectConfig::default())
    }

    pub fn project_with(&self, config: ProjectConfig) -> Project {
        Project::new(self.path(), config)
    }
}

/// 记录所有调用的进程执行器，按队列返回退出码（队列耗尽后返回 0）
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<ProcessSpec>>,
    codes: RefCell<VecDeque<i32>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            codes: RefCell::new(codes.into_iter().collect()),
        }
    }

    pub fn calls(&self) -> Vec<ProcessSpec> {
        self.calls.borrow().clone()
    }

    fn next_code(&self, spec: &ProcessSpec) -> i32 {
        self.calls.borrow_mut().push(spec.clone());
        self.codes.borrow_mut().pop_front().unwrap_or(0)
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, spec: &ProcessSpec) -> Result<i32> {
        Ok(self.next_code(spec))
    }

    fn capture(&self, spec: &ProcessSpec) -> Result<(i32, String)> {
        let code = self.next_code(spec);
        let output = if code == 0 { "Python 3.12.0" } else { "not found" };
        Ok((code, output.to_string()))
    }
}

/// 环境变量守卫 - 释放时恢复原始环境
pub struct EnvGuard {
    original_vars: HashMap<String, String>,
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvGuard {
    /// 创建一个新的环境守卫，记录当前环境变量
    pub fn new() -> Self {
        let original_vars: HashMap<String, String> = env::vars().collect();
        Self { original_vars }
    }

    /// 设置测试环境变量（自动包装为 unsafe）
    pub fn set_var(&self, key: &str, value: &str) {
        unsafe {
            env::set_var(key, value);
        }
    }

    /// 移除环境变量（自动包装为 unsafe）
    pub fn remove_var(&self, key: &str) {
        unsafe {
            env::remove_var(key);
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        let current_vars: Vec<String> = env::vars().map(|(k, _)| k).collect();
        for key in current_vars {
            if !self.original_vars.contains_key(&key) {
                self.remove_var(&key);
            }
        }

        for (key, value) in &self.original_vars {
            if env::var(key).ok().as_ref() != Some(value) {
                self.set_var(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_guard_cleanup() {
        {
            let guard = EnvGuard::new();
            guard.set_var("ASKRUN_TEST_CLEANUP_VAR", "cleanup_test");
            assert_eq!(env::var("ASKRUN_TEST_CLEANUP_VAR").unwrap(), "cleanup_test");
        }
        assert!(env::var("ASKRUN_TEST_CLEANUP_VAR").is_err());
    }

    #[test]
    fn test_recording_runner_codes() {
        let runner = RecordingRunner::with_codes([3]);
        let spec = ProcessSpec::new("x");
        assert_eq!(runner.run(&spec).unwrap(), 3);
        assert_eq!(runner.run(&spec).unwrap(), 0);
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_fixture_write_nested() {
        let fixture = ProjectFixture::new();
        fixture.write("a/b/c.txt", "x");
        assert_eq!(fixture.read("a/b/c.txt"), "x");
    }
}
