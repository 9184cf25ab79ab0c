//! 启动请求 / 响应
//!
//! 请求 `{ "action": "start", "items": [...] }`，
//! 响应 `{ "success": bool, "error": "..." }`。

use serde::{Deserialize, Serialize};

use crate::models::asn::Asn;

/// 启动一个新批次的请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub action: String,
    pub items: Vec<String>,
}

impl StartRequest {
    /// 从逗号分隔的 ASN 列表构造请求（命令行用法）
    pub fn from_asn_list(list: &str) -> Self {
        Self {
            action: "start".to_string(),
            items: list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// 是否为启动请求
    pub fn is_start(&self) -> bool {
        self.action == "start"
    }

    /// 解析并校验请求中的 ASN，跳过非法项
    pub fn parsed_items(&self) -> Vec<Asn> {
        self.items.iter().filter_map(|s| Asn::parse(s)).collect()
    }
}

/// 启动请求的处理结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StartResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let json = r#"{ "action": "start", "items": ["alice", "bob"] }"#;
        let request: StartRequest = serde_json::from_str(json).unwrap();
        assert!(request.is_start());
        assert_eq!(request.items, vec!["alice", "bob"]);
    }

    #[test]
    fn test_from_asn_list() {
        let request = StartRequest::from_asn_list("alice, bob,,charlie ");
        assert_eq!(request.items, vec!["alice", "bob", "charlie"]);
        assert_eq!(request.parsed_items().len(), 3);
    }

    #[test]
    fn test_response_omits_absent_error() {
        let json = serde_json::to_string(&StartResponse::ok()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);

        let json = serde_json::to_value(StartResponse::failed("坏了")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "坏了");
    }
}
