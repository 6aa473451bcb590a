pub mod assembler;
pub mod blocks;

pub use assembler::{ContextDocument, TranscriptLine, RECENT_WINDOW};
