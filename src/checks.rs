use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

use crate::config::Rules;

/// Build a case-insensitive whole-word matcher for a literal keyword.
///
/// Word-character edges get a `\b`. Edges such as the brackets of `[Bug]`
/// instead require a non-word neighbour or the end of the text, so the tag
/// matches at the start of a title but not inside `x[Bug]y`.
pub fn keyword_regex(keyword: &str) -> Result<Regex> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if keyword.chars().next().is_some_and(is_word) {
        r"\b"
    } else {
        r"(?:^|\W)"
    };
    let trail = if keyword.chars().last().is_some_and(is_word) {
        r"\b"
    } else {
        r"(?:\W|$)"
    };
    let pattern = format!("{lead}{}{trail}", regex::escape(keyword));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("Invalid keyword pattern for {keyword:?}"))
}

/// Split a title into words the way the length checks count them.
pub fn title_words(title: &str) -> Vec<&str> {
    title
        .split(|c: char| c == '/' || c.is_whitespace())
        .flat_map(|part| part.split(r"\\"))
        .filter(|w| !w.is_empty())
        .collect()
}

pub fn title_word_count(title: &str) -> usize {
    title_words(title).len()
}

pub fn title_has_min_words(title: &str, min: usize) -> bool {
    title_word_count(title) >= min
}

pub fn title_within_max_words(title: &str, max: usize) -> bool {
    title_word_count(title) <= max
}

/// Compiled form of [`Rules`], built once per run.
pub struct Matchers {
    bug_tag: Regex,
    feature_tag: Regex,
    keywords: Vec<Regex>,
    webui_commit: Regex,
    txt2vid_commit: Regex,
    commit_len: (usize, usize),
}

impl Matchers {
    pub fn new(rules: &Rules) -> Result<Self> {
        let keywords = rules
            .keywords
            .iter()
            .map(|k| keyword_regex(k))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            bug_tag: keyword_regex("[Bug]")?,
            feature_tag: keyword_regex("[Feature Request]")?,
            keywords,
            webui_commit: Regex::new(r"webui commit id - ([a-fA-F0-9]+)")?,
            txt2vid_commit: Regex::new(r"txt2vid commit id - ([a-fA-F0-9]+)")?,
            commit_len: (rules.min_commit_id_len, rules.max_commit_id_len),
        })
    }

    /// Only bug reports are policed; feature requests never are, even if
    /// they also carry the bug tag.
    pub fn is_bug_report(&self, title: &str) -> bool {
        self.bug_tag.is_match(title) && !self.feature_tag.is_match(title)
    }

    pub fn contains_all_keywords(&self, body: &str) -> bool {
        self.keywords.iter().all(|re| re.is_match(body))
    }

    /// Both the web UI and the extension commit ids must be present, each a
    /// hex run within the configured length bounds.
    pub fn commit_ids_valid(&self, body: &str) -> bool {
        self.commit_id_ok(&self.webui_commit, body) && self.commit_id_ok(&self.txt2vid_commit, body)
    }

    fn commit_id_ok(&self, re: &Regex, body: &str) -> bool {
        let (min, max) = self.commit_len;
        re.captures(body)
            .and_then(|caps| caps.get(1))
            .is_some_and(|id| (min..=max).contains(&id.as_str().len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matchers() -> Matchers {
        Matchers::new(&Rules::default()).unwrap()
    }

    const FULL_LOG: &str = "Python 3.10.6\n\
        Commit hash: 5ab7f213bec2f816f9c5644becb32eb72c8ffb89\n\
        Installing requirements for Web UI\n\
        Launching Web UI with arguments: --xformers\n\
        Model loaded in 4.2s\n\
        text2video extension enabled";

    #[test]
    fn bug_tag_gates_titles() {
        let m = matchers();
        assert!(m.is_bug_report("[Bug]: crash on launch"));
        assert!(m.is_bug_report("[BUG] crash on launch"));
        assert!(m.is_bug_report("crash on launch [bug]"));
        assert!(!m.is_bug_report("Bug: crash on launch"));
        assert!(!m.is_bug_report("[Feature Request]: more models"));
        assert!(!m.is_bug_report("[Bug] [Feature Request] both"));
        assert!(!m.is_bug_report("[Bugfix] typo"));
    }

    #[test]
    fn bracketed_tag_must_stand_alone() {
        let m = matchers();
        assert!(m.is_bug_report("(x) [bug], crash"));
        assert!(!m.is_bug_report("x[Bug]y crash on launch"));
        assert!(!m.is_bug_report("[bug]s crash on launch"));
        assert!(!m.is_bug_report("crash on launch_[Bug]"));
    }

    #[test]
    fn keywords_match_whole_words_case_insensitively() {
        let m = matchers();
        assert!(m.contains_all_keywords(FULL_LOG));
        assert!(m.contains_all_keywords(&FULL_LOG.to_uppercase()));
        assert!(!m.contains_all_keywords(&FULL_LOG.replace("Python", "CPython")));
        assert!(!m.contains_all_keywords(&FULL_LOG.replace("Model loaded", "Model")));
    }

    #[test]
    fn keyword_regex_escapes_metacharacters() {
        let re = keyword_regex("a.b").unwrap();
        assert!(re.is_match("x a.b y"));
        assert!(!re.is_match("x aXb y"));
    }

    #[test]
    fn title_words_split_on_slashes_and_double_backslash() {
        assert_eq!(title_words("[Bug] webui/extension crash"), vec!["[Bug]", "webui", "extension", "crash"]);
        assert_eq!(title_words(r"path\\to\\file"), vec!["path", "to", "file"]);
        assert_eq!(title_words(r"single\slash"), vec![r"single\slash"]);
        assert_eq!(title_word_count("   "), 0);
    }

    #[test]
    fn two_word_title_is_too_short_but_not_too_long() {
        assert!(!title_has_min_words("Bug fix", 3));
        assert!(title_within_max_words("Bug fix", 9));
    }

    #[test]
    fn ten_word_title_is_too_long_but_not_too_short() {
        let title = "A B C D E F G H I J";
        assert!(title_has_min_words(title, 3));
        assert!(!title_within_max_words(title, 9));
    }

    #[test]
    fn commit_ids_require_both_markers() {
        let m = matchers();
        let both = "webui commit id - abc123f\ntxt2vid commit id - 1234567";
        assert!(m.commit_ids_valid(both));
        assert!(!m.commit_ids_valid("webui commit id - abc123f"));
        assert!(!m.commit_ids_valid("txt2vid commit id - 1234567"));
        assert!(!m.commit_ids_valid(""));
    }

    #[test]
    fn commit_id_length_bounds() {
        let m = matchers();
        let body = |webui: &str| format!("webui commit id - {webui}\ntxt2vid commit id - 1234567");
        assert!(!m.commit_ids_valid(&body("abc123")));
        assert!(m.commit_ids_valid(&body(&"a".repeat(40))));
        assert!(!m.commit_ids_valid(&body(&"a".repeat(41))));
        assert!(!m.commit_ids_valid(&body("xyz1234567")));
    }
}
