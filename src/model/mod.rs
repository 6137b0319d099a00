//! Impact models expressed as asset graphs.
pub mod llm;
