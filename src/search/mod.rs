//! Similarity search over the case and claim corpora.
//!
//! The workflow nodes only see the [`SimilarityIndex`] trait; the bundled
//! implementation is an in-process lexical index built from the record store
//! at startup. Swapping in a vector index is a matter of implementing the
//! trait.

mod lexical;

pub use lexical::LexicalIndex;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SearchResult;

/// Metadata key carrying the originating case number.
pub const META_CASE_NUMBER: &str = "case_number";
/// Metadata key carrying the originating claim number.
pub const META_CLAIM_NUMBER: &str = "claim_number";

/// Which document collection a similarity query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corpus {
    /// Case descriptions and comments.
    Case,
    /// Claim numeric profiles.
    Claim,
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Corpus::Case => write!(f, "case"),
            Corpus::Claim => write!(f, "claim"),
        }
    }
}

/// One ranked similarity result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Indexed document text.
    pub content: String,
    /// Document metadata; claim-corpus hits carry case and claim numbers.
    pub metadata: HashMap<String, String>,
    /// Similarity score in `[0, 1]`, higher is more similar.
    pub score: f64,
}

impl SearchHit {
    /// A hit with empty metadata.
    pub fn new(content: impl Into<String>, score: f64) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
            score,
        }
    }

    /// Attach one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Black-box similarity search collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Top-`k` documents in `corpus` most similar to `query`, highest score
    /// first. Documents with no overlap are omitted, so fewer than `k` hits
    /// (or none) may come back.
    async fn search(&self, query: &str, corpus: Corpus, k: usize) -> SearchResult<Vec<SearchHit>>;
}
