//! RAG response types.

use crate::types::Source;
use serde::{Deserialize, Serialize};

/// Answer to one query plus the sources the tools surfaced while producing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RagResponse {
    /// Final model text
    pub answer: String,

    /// Citations, in tool registration order
    pub sources: Vec<Source>,
}

impl RagResponse {
    pub fn new(answer: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            answer: answer.into(),
            sources,
        }
    }
}
