//! .env 格式解析器 (简单原则：透明的文本解析)

use crate::error::{AskError, Result};
use crate::utils::paths;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

static LINE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn line_pattern() -> &'static Regex {
    LINE_PATTERN.get_or_init(|| {
        Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_.]*)\s*=\s*(.*?)\s*$")
            .expect("dotenv 行模式必须是合法正则")
    })
}

/// .env 格式解析器
pub struct DotenvParser;

impl DotenvParser {
    /// 解析 .env 文件内容，按出现顺序返回 (KEY, VALUE)
    ///
    /// 规则：
    /// - 忽略空行和以 # 开头的注释行
    /// - 格式：KEY=VALUE，允许 `export KEY=VALUE`
    /// - 单/双引号包裹的值去掉引号；双引号内支持 \n \" \\ 转义
    /// - 未加引号的值中，空白后的 # 开始行内注释
    /// - 未加引号的值以 \ 结尾时拼接下一行
    ///
    /// # Errors
    ///
    /// 键名非法时返回 `EnvParse`，错误信息带行号。
    pub fn parse(content: &str) -> Result<Vec<(String, String)>> {
        let mut vars = Vec::new();

        // Windows 编辑器常写入 UTF-8 BOM
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let lines: Vec<&str> = content.lines().collect();
        let mut line_num = 0;

        while line_num < lines.len() {
            let start = line_num;
            let line = lines[line_num].trim();

            if line.is_empty() || line.starts_with('#') {
                line_num += 1;
                continue;
            }

            let mut value_end = line_num;
            let mut complete_line = line.to_string();

            while complete_line.ends_with('\\')
                && !is_quoted_assignment(&complete_line)
                && value_end + 1 < lines.len()
            {
                complete_line.pop();
                value_end += 1;
                complete_line.push_str(lines[value_end].trim());
            }

            line_num = value_end + 1;

            if !complete_line.contains('=') {
                // 不是 KEY=VALUE 格式，跳过保持兼容
                continue;
            }

            let captures = line_pattern().captures(&complete_line).ok_or_else(|| {
                AskError::EnvParse(format!("第 {} 行键名无效: '{}'", start + 1, complete_line))
            })?;

            let key = captures[1].to_string();
            let value = unquote(&captures[2]);
            vars.push((key, value));
        }

        Ok(vars)
    }

    /// 读取并解析 .env 文件
    pub fn parse_file(path: &Path) -> Result<Vec<(String, String)>> {
        let content = paths::read_file(path)?;
        Self::parse(&content)
    }
}

/// 值是否以引号开头（引号内的 \ 不作续行处理）
fn is_quoted_assignment(line: &str) -> bool {
    line.split_once('=')
        .map(|(_, value)| {
            let value = value.trim_start();
            value.starts_with('"') || value.starts_with('\'')
        })
        .unwrap_or(false)
}

fn unquote(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(quote @ ('"' | '\'')) => {
            let rest = chars.as_str();
            let mut value = String::new();
            let mut escaped = false;
            for c in rest.chars() {
                if escaped {
                    match c {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        other => value.push(other),
                    }
                    escaped = false;
                } else if c == '\\' && quote == '"' {
                    escaped = true;
                } else if c == quote {
                    // 闭合引号之后的内容（如行内注释）丢弃
                    return value;
                } else {
                    value.push(c);
                }
            }
            // 缺少闭合引号，按原文处理
            raw.to_string()
        }
        _ => strip_inline_comment(raw).to_string(),
    }
}

fn strip_inline_comment(value: &str) -> &str {
    let bytes = value.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && i > 0 && bytes[i - 1].is_ascii_whitespace() {
            return value[..i].trim_end();
        }
    }
    value
}
