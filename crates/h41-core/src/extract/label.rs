//! Fuzzy matching of row and column labels.

/// Exact normalized match.
pub const SCORE_EXACT: u8 = 3;
/// Observed text starts with the target.
pub const SCORE_PREFIX: u8 = 2;
/// Observed text contains the target.
pub const SCORE_CONTAINS: u8 = 1;

/// Lower-cases, expands `&` to `and`, drops punctuation, and collapses
/// whitespace. `U.S.` and `US` normalize identically.
pub fn normalize_label(text: &str) -> String {
    let expanded = text.replace('&', " and ");
    let mut out = String::with_capacity(expanded.len());
    let mut pending_space = false;

    for ch in expanded.chars() {
        if ch.is_whitespace() {
            pending_space = true;
        } else if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Scores already-normalized texts. An empty target never matches.
pub fn score_normalized(observed: &str, target: &str) -> u8 {
    if target.is_empty() || observed.is_empty() {
        return 0;
    }
    if observed == target {
        SCORE_EXACT
    } else if observed.starts_with(target) {
        SCORE_PREFIX
    } else if observed.contains(target) {
        SCORE_CONTAINS
    } else {
        0
    }
}

pub fn score(observed: &str, target: &str) -> u8 {
    score_normalized(&normalize_label(observed), &normalize_label(target))
}

/// Candidate targets pre-normalized once per scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTargets {
    normalized: Vec<String>,
}

impl LabelTargets {
    pub fn new<S: AsRef<str>>(targets: &[S]) -> Self {
        Self {
            normalized: targets
                .iter()
                .map(|target| normalize_label(target.as_ref()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.iter().all(String::is_empty)
    }

    /// Highest score against any target and the index of the earliest
    /// target reaching it, or `None` when nothing matches.
    pub fn best_match(&self, observed: &str) -> Option<(u8, usize)> {
        let observed = normalize_label(observed);
        let mut best: Option<(u8, usize)> = None;
        for (index, target) in self.normalized.iter().enumerate() {
            let score = score_normalized(&observed, target);
            if score > best.map(|(score, _)| score).unwrap_or(0) {
                best = Some((score, index));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_punctuation_and_expands_ampersand() {
        assert_eq!(
            normalize_label("  U.S. Treasury,  General Account "),
            "us treasury general account"
        );
        assert_eq!(normalize_label("Loans & Leases (net)"), "loans and leases net");
        assert_eq!(normalize_label("Mortgage-backed securities"), "mortgagebacked securities");
        assert_eq!(normalize_label("Notes and bonds , nominal"), "notes and bonds nominal");
    }

    #[test]
    fn dotted_abbreviations_match_their_plain_spelling() {
        assert_eq!(normalize_label("U.S."), normalize_label("US"));
        assert_eq!(score("U.S. Treasury securities", "US Treasury securities"), SCORE_EXACT);
        assert_eq!(
            score("Federal Reserve notes, net of F.R. Bank holdings", "Federal Reserve notes net of FR Bank"),
            SCORE_PREFIX
        );
    }

    #[test]
    fn scores_exact_prefix_and_substring() {
        assert_eq!(score("Securities held outright", "securities held outright"), SCORE_EXACT);
        assert_eq!(score("Securities held outright 1", "Securities held outright"), SCORE_PREFIX);
        assert_eq!(score("Reverse repurchase agreements", "Repurchase agreements"), SCORE_CONTAINS);
        assert_eq!(score("Currency in circulation", "Total assets"), 0);
        assert_eq!(score("Anything", ""), 0);
    }

    #[test]
    fn best_match_prefers_earliest_target_on_equal_scores() {
        let targets = LabelTargets::new(&["General Account", "Treasury"]);
        assert_eq!(
            targets.best_match("U.S. Treasury, General Account"),
            Some((SCORE_CONTAINS, 0))
        );
        assert_eq!(targets.best_match("Gold stock"), None);
    }
}
