//! 证据文档生成服务 - 业务能力层
//!
//! 把截图拼装成可直接下载查看的 HTML 证据文档：
//! 单个 ASN 的证据页，以及整个批次的汇总页。
//! 截图以 data URI 内嵌，文档不依赖外部文件。

use chrono::Local;

use crate::models::Asn;
use crate::services::artifact_store::CapturedArtifact;

/// 证据文档生成器
#[derive(Default)]
pub struct DocumentBuilder;

impl DocumentBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 生成单个 ASN 的证据文档
    ///
    /// ASN 经过入口校验，只含字母数字和 `.` `_` `-`，可以直接内插。
    pub fn evidence_document(&self, asn: &Asn, artifacts: &[CapturedArtifact]) -> String {
        let mut sections = String::new();
        for artifact in artifacts {
            sections.push_str(&self.artifact_section(artifact));
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>Evidence for {asn}</title>
  <style>
    body {{ margin: 0; padding: 20px; font-family: Arial; }}
    img {{ max-width: 100%; border: 1px solid #ccc; }}
    .asn-info {{ margin-bottom: 20px; font-size: 16px; }}
    .timestamp {{ color: #555; font-size: 14px; }}
    .capture {{ margin-bottom: 30px; }}
    .capture h2 {{ font-size: 15px; }}
  </style>
</head>
<body>
  <div class="asn-info">ASN: {asn}</div>
  <div class="timestamp">Generated: {generated}</div>
{sections}</body>
</html>
"#,
            asn = asn.as_str(),
            generated = Local::now().format("%Y-%m-%d %H:%M:%S"),
            sections = sections,
        )
    }

    /// 生成整个批次的汇总文档（按提交顺序分节）
    pub fn summary_document(&self, sections: &[(Asn, Vec<CapturedArtifact>)]) -> String {
        let total_captures: usize = sections.iter().map(|(_, a)| a.len()).sum();

        let mut body = String::new();
        for (asn, artifacts) in sections {
            body.push_str(&format!(
                "  <h1>ASN: {}</h1>\n",
                asn.as_str()
            ));
            if artifacts.is_empty() {
                body.push_str("  <p class=\"timestamp\">No captures recorded.</p>\n");
            }
            for artifact in artifacts {
                body.push_str(&self.artifact_section(artifact));
            }
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>Evidence Summary</title>
  <style>
    body {{ margin: 0; padding: 20px; font-family: Arial; }}
    img {{ max-width: 100%; border: 1px solid #ccc; }}
    h1 {{ font-size: 18px; border-bottom: 1px solid #999; padding-bottom: 4px; }}
    .timestamp {{ color: #555; font-size: 14px; }}
    .capture {{ margin-bottom: 30px; }}
    .capture h2 {{ font-size: 15px; }}
  </style>
</head>
<body>
  <div class="timestamp">Generated: {generated} &middot; {asn_count} ASN(s), {capture_count} capture(s)</div>
{body}</body>
</html>
"#,
            generated = Local::now().format("%Y-%m-%d %H:%M:%S"),
            asn_count = sections.len(),
            capture_count = total_captures,
            body = body,
        )
    }

    /// 单张截图的片段：来源标签 + 捕获时间 + 内嵌图片
    fn artifact_section(&self, artifact: &CapturedArtifact) -> String {
        format!(
            r#"  <div class="capture">
    <h2>{label}</h2>
    <div class="timestamp">Captured: {captured}</div>
    <img src="data:image/png;base64,{data}" alt="{label}">
  </div>
"#,
            label = artifact.label,
            captured = artifact.captured_at.format("%Y-%m-%d %H:%M:%S"),
            data = artifact.image_base64,
        )
    }
}
