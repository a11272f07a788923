//! Messaging response documents returned to the inbound webhook

use std::fmt::Write;

/// A messaging-response document (`<Response>` with zero or one `<Message>`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagingResponse {
    message: Option<String>,
}

impl MessagingResponse {
    /// A response that sends nothing back to the sender
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A response carrying one text message
    #[must_use]
    pub fn message(body: impl Into<String>) -> Self {
        Self {
            message: Some(body.into()),
        }
    }

    /// Render the XML document
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?><Response>"#);
        if let Some(body) = &self.message {
            let _ = write!(xml, "<Message>{}</Message>", escape(body));
        }
        xml.push_str("</Response>");
        xml
    }
}

/// Escape text for inclusion in XML character data
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
