use serde::{Deserialize, Serialize};

/// Kind of content held by a `SourceItem`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[repr(u8)]
pub enum ContentType {
    Text = 0,
    Markdown = 1,
    Code = 2,
}

impl ContentType {
    /// Numeric value stored in the point payloads
    pub fn as_number(self) -> i64 {
        self as u8 as i64
    }
}

/// Where a `SourceItem` was collected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[repr(u8)]
pub enum SourceType {
    File = 0,
}

impl SourceType {
    pub fn as_number(self) -> i64 {
        self as u8 as i64
    }
}

/// A unit of content to index, as produced by a source processor
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceItem {
    pub content: String,
    pub content_type: ContentType,
    pub source_type: SourceType,
    /// Identifies the origin of the content, ex: `docs/intro.md#2`
    pub source_location: String,
}
