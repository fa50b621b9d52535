use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL: Regex = Regex::new(r"^https?://\S+").expect("valid regex");
    static ref DOMAIN: Regex = Regex::new(r"^\S+\.\S+").expect("valid regex");
    static ref EMAIL: Regex = Regex::new(
        r"^(?i)[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?"
    )
    .expect("valid regex");
    static ref IPV4: Regex = Regex::new(
        r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)"
    )
    .expect("valid regex");
    static ref CAPITALIZED: Regex = Regex::new(r"^[A-Z][a-zA-Z0-9-]*(?:\s[A-Z][a-zA-Z0-9-]*)+").expect("valid regex");
    static ref QUOTED: Regex = Regex::new(r"^'([^']*)'").expect("valid regex");
    static ref WORD: Regex = Regex::new(r"^[^\s{.,:;”’()?!}]+").expect("valid regex");
}

/// Characters peeled off both ends of every raw token.
const EDGE_PUNCTUATION: &[char] = &['.', ',', '\'', '"', '_', '[', ']'];

/// One tokenization rule. Rules are tried in [`RULES`] order at each scan position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Url,
    Domain,
    Email,
    Ipv4,
    /// Two or more consecutive capitalized words, kept as one token.
    CapitalizedPhrase,
    /// A single-quoted phrase standing alone between whitespace.
    QuotedPhrase,
    Word,
}

pub const RULES: [Rule; 7] = [
    Rule::Url,
    Rule::Domain,
    Rule::Email,
    Rule::Ipv4,
    Rule::CapitalizedPhrase,
    Rule::QuotedPhrase,
    Rule::Word,
];

/// A rule hit at a scan position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch<'a> {
    pub rule: Rule,
    /// Bytes consumed from the scan position.
    pub len: usize,
    /// Raw token text, before edge punctuation is stripped.
    pub token: &'a str,
}

impl Rule {
    /// Try this rule anchored at byte offset `pos` of `text`.
    pub fn match_at<'a>(self, text: &'a str, pos: usize) -> Option<RuleMatch<'a>> {
        let rest = &text[pos..];
        let found = match self {
            Rule::Url => URL.find(rest),
            Rule::Domain => DOMAIN.find(rest),
            Rule::Email => EMAIL.find(rest),
            Rule::Ipv4 => IPV4.find(rest),
            Rule::CapitalizedPhrase => CAPITALIZED.find(rest),
            Rule::QuotedPhrase => return match_quoted(text, pos),
            Rule::Word => WORD.find(rest),
        }?;
        if found.is_empty() {
            return None;
        }
        Some(RuleMatch { rule: self, len: found.end(), token: found.as_str() })
    }
}

fn match_quoted(text: &str, pos: usize) -> Option<RuleMatch<'_>> {
    let opens_cleanly = text[..pos].chars().next_back().map_or(true, char::is_whitespace);
    if !opens_cleanly {
        return None;
    }
    let caps = QUOTED.captures(&text[pos..])?;
    let whole = caps.get(0)?;
    let closes_cleanly = text[pos + whole.end()..].chars().next().map_or(true, char::is_whitespace);
    if !closes_cleanly {
        return None;
    }
    let inner = caps.get(1)?;
    Some(RuleMatch { rule: Rule::QuotedPhrase, len: whole.end(), token: inner.as_str() })
}

/// Quoted-phrase match starting just past the whitespace character at `pos`.
/// Returns the quote's offset alongside the match.
fn quoted_after_whitespace(text: &str, pos: usize) -> Option<(usize, RuleMatch<'_>)> {
    let ws = text[pos..].chars().next().filter(|c| c.is_whitespace())?;
    let start = pos + ws.len_utf8();
    if !text[start..].starts_with('\'') {
        return None;
    }
    match_quoted(text, start).map(|hit| (start, hit))
}

/// Join the lines of a document into one string.
///
/// A line ending in `-` is a hyphenated word split across lines: the hyphen
/// is dropped and the next line follows without a space. Every other line
/// break becomes a single space.
pub fn join_lines(text: &str) -> String {
    let mut joined = String::with_capacity(text.len() + 1);
    for line in text.lines() {
        match line.strip_suffix('-') {
            Some(head) => joined.push_str(head),
            None => {
                joined.push_str(line);
                joined.push(' ');
            }
        }
    }
    joined
}

/// Strip whitespace and edge punctuation from both ends of a raw token.
/// Commas inside the token survive; the normalizer removes them.
pub fn strip_edges(token: &str) -> &str {
    token.trim().trim_matches(EDGE_PUNCTUATION)
}

/// Lazily scans text, yielding stripped tokens in order. May yield empty strings.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.text.len() {
            // A quoted phrase is anchored on the whitespace before it, where no
            // other rule can start, so it beats dotted or capitalized content inside.
            if let Some(hit) = quoted_after_whitespace(self.text, self.pos) {
                self.pos = hit.0 + hit.1.len;
                return Some(strip_edges(hit.1.token));
            }
            if let Some(hit) = RULES.iter().find_map(|rule| rule.match_at(self.text, self.pos)) {
                self.pos += hit.len;
                return Some(strip_edges(hit.token));
            }
            let step = self.text[self.pos..].chars().next().map_or(1, char::len_utf8);
            self.pos += step;
        }
        None
    }
}

/// Tokenize already-joined text into raw terms.
pub fn tokenize(text: &str) -> Vec<String> {
    Tokens::new(text).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Running, runner's run!");
        assert_eq!(t, vec!["Running", "runner's", "run"]);
    }

    #[test]
    fn url_is_one_token() {
        let t = tokenize("see https://example.com/a?b=c now");
        assert_eq!(t, vec!["see", "https://example.com/a?b=c", "now"]);
    }

    #[test]
    fn dotted_strings_stay_whole() {
        assert_eq!(tokenize("visit www.rust-lang.org today"), vec!["visit", "www.rust-lang.org", "today"]);
        assert_eq!(tokenize("host 192.168.0.1 up"), vec!["host", "192.168.0.1", "up"]);
    }

    #[test]
    fn each_rule_matches_in_isolation() {
        let hit = Rule::Email.match_at("mail jo@mail.example.org", 5).unwrap();
        assert_eq!(hit.token, "jo@mail.example.org");
        let hit = Rule::Ipv4.match_at("10.0.0.255 x", 0).unwrap();
        assert_eq!(hit.token, "10.0.0.255");
        assert!(Rule::Ipv4.match_at("10.0.x", 0).is_none());
        assert!(Rule::Url.match_at("ftp://x", 0).is_none());
    }

    #[test]
    fn capitalized_phrase_is_single_token() {
        let t = tokenize("I flew to New York City yesterday");
        assert_eq!(t, vec!["I", "flew", "to", "New York City", "yesterday"]);
    }

    #[test]
    fn quoted_phrase_loses_quotes() {
        let t = tokenize("he said 'hello there friend' and left");
        assert_eq!(t, vec!["he", "said", "hello there friend", "and", "left"]);
    }

    #[test]
    fn quoted_phrase_needs_whitespace_boundaries() {
        assert!(Rule::QuotedPhrase.match_at("x'ab' c", 1).is_none());
        assert!(Rule::QuotedPhrase.match_at("'ab'c", 0).is_none());
        assert_eq!(Rule::QuotedPhrase.match_at("'ab c'", 0).unwrap().token, "ab c");
    }

    #[test]
    fn quoted_phrase_beats_dotted_content_inside() {
        assert_eq!(tokenize("he said 'e.g. this' ok"), vec!["he", "said", "e.g. this", "ok"]);
        assert_eq!(tokenize("see 'New York' now"), vec!["see", "New York", "now"]);
    }

    #[test]
    fn leading_quote_keeps_rule_order() {
        // At the very start no whitespace anchors the quote, so the domain rule wins.
        assert_eq!(tokenize("'e.g. this' ok")[0], "e.g");
    }

    #[test]
    fn word_rule_stops_at_punctuation() {
        assert_eq!(tokenize("cat;dog(bird)?"), vec!["cat", "dog", "bird"]);
    }

    #[test]
    fn edges_are_stripped_repeatedly() {
        assert_eq!(strip_edges("\"_[word]_\""), "word");
        assert_eq!(strip_edges("a,b,"), "a,b");
        assert_eq!(strip_edges("'''"), "");
    }

    #[test]
    fn hyphenated_line_breaks_join() {
        assert_eq!(join_lines("infor-\nmation retrieval\nsystems"), "information retrieval systems ");
    }

    #[test]
    fn tokens_iterator_restarts() {
        let tokens = Tokens::new("alpha beta");
        let first: Vec<_> = tokens.clone().collect();
        let second: Vec<_> = tokens.collect();
        assert_eq!(first, second);
    }
}
