//! Input classification for the workflow entry node.
//!
//! Classification is a pure function of the input text. Mode-dependent policy
//! (such as the chat-mode guard against bare case numbers) lives in the entry
//! node, which combines [`resolve`] with the invocation mode.

use serde::{Deserialize, Serialize};

const CASE_ID_PREFIX: &str = "MR";
const CLAIM_ID_PREFIX: &str = "CL";
const CASE_TEXT_PREFIX: &str = "case text:";
const CLAIM_TEXT_PREFIX: &str = "claim text:";

/// Typed classification of raw user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Case identifier such as `MR123456`.
    CaseId(String),
    /// Claim identifier such as `CL123456`.
    ClaimId(String),
    /// Free text explicitly marked as case content.
    CaseText(String),
    /// Free text explicitly marked as claim content.
    ClaimText(String),
    /// Input matching none of the recognized shapes.
    Unrecognized,
}

impl Intent {
    /// The embedded identifier, for the lookup-backed variants.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Intent::CaseId(id) | Intent::ClaimId(id) => Some(id),
            _ => None,
        }
    }
}

/// Classify raw user input. Rules apply in priority order: case identifier,
/// claim identifier, `case text:` prefix, `claim text:` prefix, unrecognized.
pub fn resolve(text: &str) -> Intent {
    let trimmed = text.trim();
    if is_identifier(trimmed, CASE_ID_PREFIX) {
        return Intent::CaseId(trimmed.to_string());
    }
    if is_identifier(trimmed, CLAIM_ID_PREFIX) {
        return Intent::ClaimId(trimmed.to_string());
    }
    if let Some(body) = strip_prefix_ignore_case(trimmed, CASE_TEXT_PREFIX) {
        return Intent::CaseText(body.trim().to_string());
    }
    if let Some(body) = strip_prefix_ignore_case(trimmed, CLAIM_TEXT_PREFIX) {
        return Intent::ClaimText(body.trim().to_string());
    }
    Intent::Unrecognized
}

/// True when the trimmed input is a bare 4-6 digit token. Chat mode rejects
/// these ahead of resolution, pointing the user at similarity mode instead.
pub fn is_bare_case_number(text: &str) -> bool {
    let trimmed = text.trim();
    (4..=6).contains(&trimmed.len()) && trimmed.bytes().all(|b| b.is_ascii_digit())
}

/// Full match on `<prefix>` followed by 4-6 ASCII digits, nothing else.
fn is_identifier(text: &str, prefix: &str) -> bool {
    match text.strip_prefix(prefix) {
        Some(digits) => {
            (4..=6).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() < prefix.len() || !text.is_char_boundary(prefix.len()) {
        return None;
    }
    if text[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}
