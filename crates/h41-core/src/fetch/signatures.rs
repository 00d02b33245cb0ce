//! Content checks that tell a real edition from an interstitial.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::ContentSignatures;

static LARGE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,3}(?:,\d{3})+\b").expect("large-number pattern is valid")
});

/// Outcome of checking a fetched body for edition signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentVerdict {
    Valid { score: usize },
    /// Only the generic site banner was present: a consent or block page.
    BannerOnly { score: usize },
    MissingSignatures { score: usize },
}

impl ContentVerdict {
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    pub const fn score(self) -> usize {
        match self {
            Self::Valid { score } | Self::BannerOnly { score } | Self::MissingSignatures { score } => {
                score
            }
        }
    }
}

/// Number of signature phrases present, case-insensitively.
pub fn signature_score(body: &str, signatures: &ContentSignatures) -> usize {
    let haystack = body.to_lowercase();
    signatures
        .phrases
        .iter()
        .filter(|phrase| !phrase.is_empty() && haystack.contains(&phrase.to_lowercase()))
        .count()
}

pub fn classify_content(
    body: &str,
    signatures: &ContentSignatures,
    min_signatures: usize,
) -> ContentVerdict {
    let score = signature_score(body, signatures);
    if score >= min_signatures {
        return ContentVerdict::Valid { score };
    }
    let banner = signatures.banner.to_lowercase();
    if !banner.is_empty() && body.to_lowercase().contains(&banner) {
        ContentVerdict::BannerOnly { score }
    } else {
        ContentVerdict::MissingSignatures { score }
    }
}

/// Count of thousands-separated figures, the marker of real tabular data.
pub fn large_number_count(body: &str) -> usize {
    LARGE_NUMBER.find_iter(body).count()
}

/// Cheap probe check: enough signatures and enough large figures.
pub fn looks_like_edition(
    body: &str,
    signatures: &ContentSignatures,
    min_signatures: usize,
    min_large_numbers: usize,
) -> bool {
    signature_score(body, signatures) >= min_signatures
        && large_number_count(body) >= min_large_numbers
}
