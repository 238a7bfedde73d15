//! Whole-word, case-insensitive keyword counting.
//!
//! Keywords are literal text: they are regex-escaped before compiling, so
//! `c&a` or `r$10` match as written. A hit counts only when the characters
//! on both sides of it are non-word characters (or the text edge), where a
//! word character is alphanumeric or `_`. Hits never overlap.

use instamon_core::CountPolicy;
use regex::{Regex, RegexBuilder};

use crate::error::MonitorError;

/// Counts the whole-word, case-insensitive occurrences of `keyword` in `text`.
///
/// Returns `0` for empty text or an empty keyword.
#[must_use]
pub fn count_occurrences(text: &str, keyword: &str) -> usize {
    match compile(keyword) {
        Ok(Some(pattern)) => count_whole_words(&pattern, text),
        Ok(None) | Err(_) => 0,
    }
}

fn compile(keyword: &str) -> Result<Option<Regex>, regex::Error> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
        .map(Some)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn count_whole_words(pattern: &Regex, text: &str) -> usize {
    let mut count = 0;
    let mut start = 0;

    while let Some(m) = pattern.find_at(text, start) {
        if m.is_empty() {
            break;
        }
        let before_ok = text[..m.start()]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = text[m.end()..]
            .chars()
            .next()
            .map_or(true, |c| !is_word_char(c));

        if before_ok && after_ok {
            count += 1;
            start = m.end();
        } else {
            // Rejected candidate: resume one character later.
            let step = text[m.start()..].chars().next().map_or(1, char::len_utf8);
            start = m.start() + step;
        }
        if start > text.len() {
            break;
        }
    }
    count
}

/// Per-keyword totals for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u64,
    pub likes: u64,
}

/// Keyword totals in input order. Every keyword has exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTally {
    entries: Vec<KeywordCount>,
    likes_tracked: bool,
}

impl KeywordTally {
    #[must_use]
    pub fn new(keywords: &[String], likes_tracked: bool) -> Self {
        Self {
            entries: keywords
                .iter()
                .map(|k| KeywordCount {
                    keyword: k.clone(),
                    count: 0,
                    likes: 0,
                })
                .collect(),
            likes_tracked,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[KeywordCount] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, keyword: &str) -> Option<&KeywordCount> {
        self.entries.iter().find(|e| e.keyword == keyword)
    }

    #[must_use]
    pub fn likes_tracked(&self) -> bool {
        self.likes_tracked
    }

    /// Human-readable summary line for one entry.
    #[must_use]
    pub fn summary_line(&self, entry: &KeywordCount) -> String {
        if self.likes_tracked {
            format!(
                "The keyword '{}' was mentioned {} times ({} likes).",
                entry.keyword, entry.count, entry.likes
            )
        } else {
            format!(
                "The keyword '{}' was mentioned {} times.",
                entry.keyword, entry.count
            )
        }
    }
}

/// Compiled keyword set plus the counting policy of the run.
#[derive(Debug)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
    patterns: Vec<Option<Regex>>,
    policy: CountPolicy,
    accumulate_likes: bool,
}

impl KeywordMatcher {
    /// Compiles one escaped, case-insensitive pattern per keyword.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Pattern`] if a pattern fails to compile,
    /// e.g. when it exceeds the regex size limit.
    pub fn new(
        keywords: &[String],
        policy: CountPolicy,
        accumulate_likes: bool,
    ) -> Result<Self, MonitorError> {
        let patterns = keywords
            .iter()
            .map(|k| {
                compile(k).map_err(|source| MonitorError::Pattern {
                    keyword: k.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            keywords: keywords.to_vec(),
            patterns,
            policy,
            accumulate_likes,
        })
    }

    /// A tally with one zeroed entry per keyword this matcher was built with.
    #[must_use]
    pub fn empty_tally(&self) -> KeywordTally {
        KeywordTally::new(&self.keywords, self.accumulate_likes)
    }

    /// Adds the hits in `text` to `tally`, which must come from
    /// [`Self::empty_tally`].
    ///
    /// Under [`CountPolicy::Occurrences`] every hit counts and adds
    /// `like_count` once; under [`CountPolicy::PerComment`] a text counts at
    /// most once per keyword. Returns the number of units added across all
    /// keywords.
    pub fn record(&self, text: &str, like_count: u64, tally: &mut KeywordTally) -> u64 {
        if text.is_empty() {
            return 0;
        }
        let mut added = 0u64;
        for (pattern, entry) in self.patterns.iter().zip(tally.entries.iter_mut()) {
            let Some(pattern) = pattern else { continue };
            let hits = count_whole_words(pattern, text) as u64;
            let units = match self.policy {
                CountPolicy::Occurrences => hits,
                CountPolicy::PerComment => hits.min(1),
            };
            if units == 0 {
                continue;
            }
            entry.count = entry.count.saturating_add(units);
            if self.accumulate_likes {
                entry.likes = entry.likes.saturating_add(units.saturating_mul(like_count));
            }
            added += units;
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn counts_case_insensitive_whole_words() {
        assert_eq!(count_occurrences("I love CEA and cea!", "cea"), 2);
    }

    #[test]
    fn keyword_with_metacharacters_matches_literally() {
        assert_eq!(count_occurrences("Shop at C&A today", "C&A"), 1);
        assert_eq!(count_occurrences("costs r$10 or R$10.", "r$10"), 2);
        assert_eq!(count_occurrences("a.b axb", "a.b"), 1);
        assert_eq!(count_occurrences("(promo) promo", "(promo)"), 1);
    }

    #[test]
    fn partial_words_do_not_match() {
        assert_eq!(count_occurrences("ceará ceas acea cea_x", "cea"), 0);
        assert_eq!(count_occurrences("ceabrand", "cea"), 0);
    }

    #[test]
    fn punctuation_and_edges_are_boundaries() {
        assert_eq!(count_occurrences("cea,cea.cea", "cea"), 3);
        assert_eq!(count_occurrences("#cea @cea", "cea"), 2);
    }

    #[test]
    fn keyword_starting_with_symbol_needs_non_word_before() {
        assert_eq!(count_occurrences("#promo today", "#promo"), 1);
        assert_eq!(count_occurrences("x#promo", "#promo"), 0);
    }

    #[test]
    fn multi_word_keyword() {
        assert_eq!(count_occurrences("Black Friday! black   friday, BLACK FRIDAY", "black friday"), 2);
    }

    #[test]
    fn empty_text_or_keyword_is_zero() {
        assert_eq!(count_occurrences("", "cea"), 0);
        assert_eq!(count_occurrences("cea", ""), 0);
        assert_eq!(count_occurrences("cea", "   "), 0);
    }

    #[test]
    fn non_ascii_case_folding() {
        assert_eq!(count_occurrences("ÓTIMO produto, ótimo!", "ótimo"), 2);
    }

    #[test]
    fn retries_after_rejected_overlapping_candidate() {
        // "aa" inside "aaa" is rejected, the standalone "aa" still counts.
        assert_eq!(count_occurrences("aaa aa", "aa"), 1);
    }

    #[test]
    fn occurrence_policy_counts_every_hit_and_likes_per_hit() {
        let kws = keywords(&["cea", "promo"]);
        let matcher = KeywordMatcher::new(&kws, CountPolicy::Occurrences, true).unwrap();
        let mut tally = matcher.empty_tally();

        let added = matcher.record("cea CEA cea promo", 5, &mut tally);

        assert_eq!(added, 4);
        assert_eq!(tally.get("cea").unwrap().count, 3);
        assert_eq!(tally.get("cea").unwrap().likes, 15);
        assert_eq!(tally.get("promo").unwrap().count, 1);
        assert_eq!(tally.get("promo").unwrap().likes, 5);
    }

    #[test]
    fn per_comment_policy_counts_once_per_text() {
        let kws = keywords(&["cea"]);
        let matcher = KeywordMatcher::new(&kws, CountPolicy::PerComment, true).unwrap();
        let mut tally = matcher.empty_tally();

        matcher.record("cea cea cea", 4, &mut tally);
        matcher.record("no match here", 9, &mut tally);
        matcher.record("CEA again", 1, &mut tally);

        let entry = tally.get("cea").unwrap();
        assert_eq!(entry.count, 2);
        assert_eq!(entry.likes, 5);
    }

    #[test]
    fn likes_untouched_when_accumulation_disabled() {
        let kws = keywords(&["cea"]);
        let matcher = KeywordMatcher::new(&kws, CountPolicy::Occurrences, false).unwrap();
        let mut tally = matcher.empty_tally();

        matcher.record("cea", 100, &mut tally);

        assert_eq!(tally.get("cea").unwrap().likes, 0);
        assert!(!tally.likes_tracked());
        assert_eq!(
            tally.summary_line(tally.get("cea").unwrap()),
            "The keyword 'cea' was mentioned 1 times."
        );
    }

    #[test]
    fn unmatched_keyword_keeps_zero_entry() {
        let kws = keywords(&["a", "b"]);
        let matcher = KeywordMatcher::new(&kws, CountPolicy::Occurrences, true).unwrap();
        let mut tally = matcher.empty_tally();

        matcher.record("a a", 0, &mut tally);

        assert_eq!(tally.entries().len(), 2);
        assert_eq!(tally.entries()[1].keyword, "b");
        assert_eq!(tally.entries()[1].count, 0);
    }
}
