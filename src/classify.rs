//! Commit classification.
//!
//! All matching is plain lower-cased substring search, not word matching:
//! a message mentioning a "fixture" counts as a bugfix because it contains
//! "fix". This imprecision is a known limitation of the heuristic.

/// Message fragments that mark a commit as a defect repair.
pub const DEFAULT_BUGFIX_KEYWORDS: &[&str] =
    &["fix", "bug", "error", "correction", "bug-fix", "bugfix"];

/// Decides whether a commit message signals a bugfix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugfixMatcher {
    keywords: Vec<String>,
}

impl BugfixMatcher {
    /// Replaces the default keyword set. Blank entries are ignored; if
    /// nothing remains the defaults are used.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords: Vec<String> = normalize_keywords(keywords);
        if keywords.is_empty() {
            Self::default()
        } else {
            Self { keywords }
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_bugfix(&self, message: &str) -> bool {
        contains_any(&message.to_lowercase(), &self.keywords)
    }
}

impl Default for BugfixMatcher {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_BUGFIX_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Bugfix check against [`DEFAULT_BUGFIX_KEYWORDS`].
pub fn is_bugfix(message: &str) -> bool {
    let lower = message.to_lowercase();
    DEFAULT_BUGFIX_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Any-match keyword filter. An empty keyword list accepts every message.
pub fn matches_keywords(message: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let lower = message.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}

/// `extension` must already be normalized, see [`normalize_extension`].
pub fn passes_extension(path: &str, extension: Option<&str>) -> bool {
    match extension {
        Some(ext) => path.ends_with(ext),
        None => true,
    }
}

/// `"py"` and `".py"` both become `".py"`. Blank input means no filter.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "." {
        return None;
    }
    if trimmed.starts_with('.') {
        Some(trimmed.to_string())
    } else {
        Some(format!(".{trimmed}"))
    }
}

/// Trims, lower-cases and drops blank keywords.
pub fn normalize_keywords<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}
