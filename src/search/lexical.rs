use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use super::{Corpus, SearchHit, SimilarityIndex, META_CASE_NUMBER, META_CLAIM_NUMBER};
use crate::error::{SearchResult, StorageResult};
use crate::records::{CaseRecord, ClaimRecord, RecordStore};

/// In-process lexical similarity index.
///
/// Documents are bag-of-words term-frequency vectors; similarity is cosine
/// over those vectors. Good enough for the bundled reference corpora, and it
/// keeps the assistant self-contained.
pub struct LexicalIndex {
    cases: Vec<Document>,
    claims: Vec<Document>,
}

struct Document {
    content: String,
    metadata: HashMap<String, String>,
    terms: HashMap<String, f64>,
    norm: f64,
}

impl Document {
    fn new(content: String, metadata: HashMap<String, String>) -> Self {
        let terms = term_frequencies(&content);
        let norm = vector_norm(&terms);
        Self {
            content,
            metadata,
            terms,
            norm,
        }
    }
}

impl LexicalIndex {
    /// Build the index from every record in the store.
    pub async fn from_store(store: &dyn RecordStore) -> StorageResult<Self> {
        let cases = store.list_cases().await?;
        let claims = store.list_claims().await?;
        let index = Self::from_records(&cases, &claims);
        debug!(
            cases = index.cases.len(),
            claims = index.claims.len(),
            "Built lexical index"
        );
        Ok(index)
    }

    /// Build the index from in-memory records.
    pub fn from_records(cases: &[CaseRecord], claims: &[ClaimRecord]) -> Self {
        let cases = cases
            .iter()
            .map(|case| {
                let metadata =
                    HashMap::from([(META_CASE_NUMBER.to_string(), case.case_number.clone())]);
                Document::new(case.context_text(), metadata)
            })
            .collect();

        let claims = claims
            .iter()
            .map(|claim| {
                let metadata = HashMap::from([
                    (META_CASE_NUMBER.to_string(), claim.case_number.clone()),
                    (META_CLAIM_NUMBER.to_string(), claim.claim_number.clone()),
                ]);
                Document::new(claim.context_text(), metadata)
            })
            .collect();

        Self { cases, claims }
    }

    /// Number of indexed case documents.
    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    /// Number of indexed claim documents.
    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    fn documents(&self, corpus: Corpus) -> &[Document] {
        match corpus {
            Corpus::Case => &self.cases,
            Corpus::Claim => &self.claims,
        }
    }
}

#[async_trait]
impl SimilarityIndex for LexicalIndex {
    async fn search(&self, query: &str, corpus: Corpus, k: usize) -> SearchResult<Vec<SearchHit>> {
        let query_terms = term_frequencies(query);
        let query_norm = vector_norm(&query_terms);

        let mut hits: Vec<SearchHit> = self
            .documents(corpus)
            .iter()
            .filter_map(|doc| {
                let score = cosine(&query_terms, query_norm, doc);
                // Zero overlap is not a result
                if score > 0.0 {
                    Some(SearchHit {
                        content: doc.content.clone(),
                        metadata: doc.metadata.clone(),
                        score,
                    })
                } else {
                    None
                }
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(k);

        Ok(hits)
    }
}

fn term_frequencies(text: &str) -> HashMap<String, f64> {
    let mut terms: HashMap<String, f64> = HashMap::new();
    for token in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        *terms.entry(token.to_string()).or_insert(0.0) += 1.0;
    }
    terms
}

fn vector_norm(terms: &HashMap<String, f64>) -> f64 {
    terms.values().map(|v| v * v).sum::<f64>().sqrt()
}

fn cosine(query: &HashMap<String, f64>, query_norm: f64, doc: &Document) -> f64 {
    if query_norm == 0.0 || doc.norm == 0.0 {
        return 0.0;
    }
    let dot: f64 = query
        .iter()
        .filter_map(|(term, weight)| doc.terms.get(term).map(|dw| weight * dw))
        .sum();
    dot / (query_norm * doc.norm)
}
