//! src/services/configuration_interceptor.rs
//!
//! Decorates a tenant's `conf.xml` on its way to a desktop client. The file
//! is passed through as-is except for one `<launch-server>` element injected
//! as the last child of the root element, telling the client which tenant
//! and server it was launched from. A `<launch-server>` block already present
//! in the stored file is replaced, never duplicated.

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

const BLOCK_OPEN: &str = "<launch-server>";
const BLOCK_CLOSE: &str = "</launch-server>";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InterceptError {
    #[error("configuration of tenant `{tenant}` is invalid: {reason}")]
    InvalidConfiguration { tenant: String, reason: &'static str },
}

#[derive(Clone, Debug)]
pub struct ConfigurationInterceptor {
    /// Base URL clients use to reach this server, without trailing slash.
    pub public_url: String,
}

impl ConfigurationInterceptor {
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into(),
        }
    }

    /// Decorate `conf_xml` for `tenant`, stamping the current time.
    pub fn intercept(&self, tenant: &str, conf_xml: &str) -> Result<String, InterceptError> {
        self.intercept_at(tenant, conf_xml, Utc::now())
    }

    pub fn intercept_at(
        &self,
        tenant: &str,
        conf_xml: &str,
        generated_at: DateTime<Utc>,
    ) -> Result<String, InterceptError> {
        let invalid = |reason| InterceptError::InvalidConfiguration {
            tenant: tenant.to_string(),
            reason,
        };

        let stripped = strip_existing_block(conf_xml)
            .ok_or_else(|| invalid("unterminated <launch-server> element"))?;
        let root_close = stripped[..trailing_misc_start(&stripped)]
            .rfind("</")
            .ok_or_else(|| invalid("missing root element closing tag"))?;

        let (head, tail) = stripped.split_at(root_close);
        let line_start = head.rfind('\n').map_or(0, |i| i + 1);
        let close_indent = &head[line_start..];

        let mut out = String::with_capacity(stripped.len() + 256);
        if line_start > 0 && close_indent.trim().is_empty() {
            // Close tag on its own line: nest the block one level deeper
            // and keep the tag's indentation.
            out.push_str(head);
            out.push_str("  ");
            out.push_str(&self.server_block(tenant, generated_at));
            out.push('\n');
            out.push_str(close_indent);
        } else {
            out.push_str(head);
            out.push_str(&self.server_block(tenant, generated_at));
            out.push('\n');
        }
        out.push_str(tail);
        Ok(out)
    }

    fn server_block(&self, tenant: &str, generated_at: DateTime<Utc>) -> String {
        let mut xml = String::from(BLOCK_OPEN);
        xml.push_str(&format!("<tenant>{}</tenant>", xml_escape(tenant)));
        xml.push_str(&format!(
            "<base-url>{}</base-url>",
            xml_escape(&self.public_url)
        ));
        xml.push_str(&format!(
            "<resources-url>{}/{}/launch-resources</resources-url>",
            xml_escape(&self.public_url),
            xml_escape(tenant)
        ));
        xml.push_str(&format!(
            "<generated-at>{}</generated-at>",
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        xml.push_str(BLOCK_CLOSE);
        xml
    }
}

/// Remove every `<launch-server>...</launch-server>` block plus the line it
/// sat on when the block was alone on that line. `None` if a block never
/// closes.
fn strip_existing_block(xml: &str) -> Option<String> {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;
    while let Some(start) = rest.find(BLOCK_OPEN) {
        let end = start + rest[start..].find(BLOCK_CLOSE)? + BLOCK_CLOSE.len();
        let before = &rest[..start];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let alone_on_line = before[line_start..].trim().is_empty();
        if alone_on_line && rest[end..].starts_with('\n') {
            out.push_str(&before[..line_start]);
            rest = &rest[end + 1..];
        } else {
            out.push_str(before);
            rest = &rest[end..];
        }
    }
    out.push_str(rest);
    Some(out)
}

/// Byte offset where the comments, processing instructions and whitespace
/// that follow the root element begin.
fn trailing_misc_start(xml: &str) -> usize {
    let mut end = xml.trim_end().len();
    loop {
        let rest = &xml[..end];
        let cut = if rest.ends_with("-->") {
            rest.rfind("<!--")
        } else if rest.ends_with("?>") {
            rest.rfind("<?")
        } else {
            None
        };
        match cut {
            Some(start) => end = xml[..start].trim_end().len(),
            None => return end,
        }
    }
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn interceptor() -> ConfigurationInterceptor {
        ConfigurationInterceptor::new("https://dc.example.com")
    }

    const CONF: &str = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<configuration>\n",
        "  <datastore-catalog/>\n",
        "</configuration>\n",
    );

    #[test]
    fn injects_server_block_before_root_close() {
        let out = interceptor()
            .intercept_at("demo", CONF, fixed_time())
            .unwrap();

        let expected = concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<configuration>\n",
            "  <datastore-catalog/>\n",
            "  <launch-server><tenant>demo</tenant>",
            "<base-url>https://dc.example.com</base-url>",
            "<resources-url>https://dc.example.com/demo/launch-resources</resources-url>",
            "<generated-at>2024-03-01T12:00:00Z</generated-at></launch-server>\n",
            "</configuration>\n",
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn decorating_twice_keeps_a_single_block() {
        let once = interceptor()
            .intercept_at("demo", CONF, fixed_time())
            .unwrap();
        let twice = interceptor()
            .intercept_at("demo", &once, fixed_time())
            .unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.matches(BLOCK_OPEN).count(), 1);
    }

    #[test]
    fn escapes_values() {
        let interceptor = ConfigurationInterceptor::new("http://host/?a=1&b=<2>");
        let out = interceptor
            .intercept_at("demo", "<configuration></configuration>", fixed_time())
            .unwrap();
        assert!(out.contains("<base-url>http://host/?a=1&amp;b=&lt;2&gt;</base-url>"));
    }

    #[test]
    fn rejects_documents_without_closing_tag() {
        let err = interceptor()
            .intercept_at("demo", "<configuration/>", fixed_time())
            .unwrap_err();
        assert_eq!(
            err,
            InterceptError::InvalidConfiguration {
                tenant: "demo".into(),
                reason: "missing root element closing tag",
            }
        );
    }

    #[test]
    fn rejects_unterminated_server_block() {
        let err = interceptor()
            .intercept_at(
                "demo",
                "<configuration><launch-server></configuration>",
                fixed_time(),
            )
            .unwrap_err();
        assert!(matches!(err, InterceptError::InvalidConfiguration { .. }));
    }

    #[test]
    fn trailing_comments_after_root_are_skipped() {
        let conf = "<configuration>\n</configuration>\n<!-- see </x> -->\n";
        let out = interceptor()
            .intercept_at("demo", conf, fixed_time())
            .unwrap();

        let block_at = out.find(BLOCK_OPEN).unwrap();
        assert!(block_at < out.find("</configuration>").unwrap());
        assert!(out.ends_with("</configuration>\n<!-- see </x> -->\n"));
    }

    #[test]
    fn indented_close_tag_keeps_its_indentation() {
        let conf = "<configuration>\n    <datastore-catalog/>\n  </configuration>";
        let once = interceptor()
            .intercept_at("demo", conf, fixed_time())
            .unwrap();

        assert!(once.starts_with("<configuration>\n    <datastore-catalog/>\n    <launch-server>"));
        assert!(once.ends_with("</launch-server>\n  </configuration>"));

        let twice = interceptor()
            .intercept_at("demo", &once, fixed_time())
            .unwrap();
        assert_eq!(once, twice);
    }
}
