//! ASN 标识符
//!
//! 一个 ASN 就是一个不透明的字符串编号，驱动一次"开页 + 截图"工作单元。

use std::fmt::Display;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// ASN 合法字符：字母数字开头，允许 `.` `_` `-`
fn asn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("ASN 校验正则必定合法"))
}

/// 单个 ASN 标识符
///
/// 反序列化经过 `TryFrom<String>` 走同一套校验，手改过的状态文件
/// 混不进非法字符串。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Asn(String);

impl TryFrom<String> for Asn {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("非法的 ASN: {value:?}"))
    }
}

impl Asn {
    /// 解析单个 ASN（去除首尾空白，非法输入返回 None）
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !asn_pattern().is_match(trimmed) {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// 解析逗号分隔的 ASN 列表，静默跳过空项和非法项
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',').filter_map(Self::parse).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Asn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
