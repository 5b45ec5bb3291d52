//! Conversion results.

use crate::model::{ImageMap, MarkdownBlock, MessageGroup};
use crate::pipeline::images::TempImageStore;
use serde::Serialize;

/// Everything one conversion produced.
///
/// When images were extracted into a scoped temporary directory, that
/// directory lives exactly as long as this value: keep it alive until
/// preview or delivery is finished.
#[derive(Debug, Serialize)]
pub struct ConversionOutput {
    /// Normalized HTML (the preview surface).
    pub html: String,
    /// Transcribed blocks in document order.
    pub blocks: Vec<MarkdownBlock>,
    /// Blocks packed into delivery units.
    pub groups: Vec<MessageGroup>,
    /// Group texts joined with a blank line.
    pub markdown: String,
    /// Inline image reference → stored file.
    pub images: ImageMap,
    pub stats: ConversionStats,
    #[serde(skip)]
    pub(crate) scratch: Option<TempImageStore>,
}

impl ConversionOutput {
    /// True when the extracted images are removed together with this value.
    pub fn images_are_temporary(&self) -> bool {
        self.scratch.is_some()
    }
}

/// Counters for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    pub blocks: usize,
    pub groups: usize,
    pub images: usize,
    pub tables: usize,
    pub duration_ms: u64,
}
