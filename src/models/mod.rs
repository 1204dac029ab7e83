//! Data models for documents and synthesis results.

mod analysis;
mod document;

pub use analysis::{
    CombinedAnalysis, DocumentAnalysis, StudyGuideSection, OVERVIEW_SECTION_ID,
};
pub use document::{fingerprint, Document};
