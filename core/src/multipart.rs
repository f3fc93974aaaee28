//! multipart/form-data bodies for `ApiClient::post_form`.
//!
//! `FormData` only describes the parts. The transport encodes them and
//! chooses the boundary, so it also owns the `Content-Type` header value.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// Ordered set of form fields and files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: Vec<Part>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::Text {
            name: single_line(name.into()),
            value: value.into(),
        });
        self
    }

    /// Add a file part. Line breaks in `name`, `filename` and
    /// `content_type` are dropped; they end up in part headers.
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push(Part::File {
            name: single_line(name.into()),
            filename: single_line(filename.into()),
            content_type: single_line(content_type.into()),
            bytes: bytes.into(),
        });
        self
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

fn single_line(mut s: String) -> String {
    s.retain(|c| c != '\r' && c != '\n');
    s
}
