//! Suffix-stripping stemmers.
//!
//! [`porter_stem`] is the classic Porter (1980) algorithm: five ordered rule
//! groups, each gated on the *measure* of the stem, i.e. the number of
//! vowel-consonant sequences in it. It works on one word at a time and keeps
//! no state between calls. The Snowball English stemmer from `rust-stemmers`
//! is available as an alternative.

use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref SNOWBALL: Stemmer = Stemmer::create(Algorithm::English);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StemmerKind {
    #[default]
    Porter,
    Snowball,
}

impl StemmerKind {
    pub fn stem(self, word: &str) -> String {
        match self {
            StemmerKind::Porter => porter_stem(word),
            StemmerKind::Snowball => SNOWBALL.stem(word).into_owned(),
        }
    }
}

impl fmt::Display for StemmerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StemmerKind::Porter => "porter",
            StemmerKind::Snowball => "snowball",
        })
    }
}

impl FromStr for StemmerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "porter" => Ok(StemmerKind::Porter),
            "snowball" => Ok(StemmerKind::Snowball),
            other => Err(format!("unknown stemmer '{other}' (expected porter or snowball)")),
        }
    }
}

/// Stem one lowercase word with the Porter algorithm.
pub fn porter_stem(word: &str) -> String {
    let mut w = Word::new(word);
    if w.k > 1 {
        w.step1ab();
        w.step1c();
        w.step2();
        w.step3();
        w.step4();
        w.step5();
    }
    w.into_string()
}

/// Working buffer for one word. `k` is the index of the last live character,
/// `j` marks the end of the stem left by the most recent suffix test and may
/// be -1 when the whole word is the suffix.
struct Word {
    b: Vec<char>,
    k: isize,
    j: isize,
}

impl Word {
    fn new(word: &str) -> Self {
        let b: Vec<char> = word.chars().collect();
        let k = b.len() as isize - 1;
        Self { b, k, j: 0 }
    }

    fn into_string(mut self) -> String {
        self.b.truncate((self.k + 1).max(0) as usize);
        self.b.into_iter().collect()
    }

    fn at(&self, i: isize) -> char {
        self.b[i as usize]
    }

    fn cons(&self, i: isize) -> bool {
        match self.at(i) {
            'a' | 'e' | 'i' | 'o' | 'u' => false,
            'y' => i == 0 || !self.cons(i - 1),
            _ => true,
        }
    }

    /// Measure of `b[0..=j]`: the n in `[C](VC){n}[V]`.
    fn m(&self) -> usize {
        let mut n = 0;
        let mut i = 0;
        loop {
            if i > self.j {
                return n;
            }
            if !self.cons(i) {
                break;
            }
            i += 1;
        }
        i += 1;
        loop {
            loop {
                if i > self.j {
                    return n;
                }
                if self.cons(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
            n += 1;
            loop {
                if i > self.j {
                    return n;
                }
                if !self.cons(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
        }
    }

    fn vowel_in_stem(&self) -> bool {
        (0..=self.j).any(|i| !self.cons(i))
    }

    fn double_consonant(&self, j: isize) -> bool {
        j >= 1 && self.at(j) == self.at(j - 1) && self.cons(j)
    }

    /// consonant-vowel-consonant ending at `i`, where the last consonant is not w, x or y.
    fn cvc(&self, i: isize) -> bool {
        if i < 2 || !self.cons(i) || self.cons(i - 1) || !self.cons(i - 2) {
            return false;
        }
        !matches!(self.at(i), 'w' | 'x' | 'y')
    }

    fn ends(&mut self, suffix: &str) -> bool {
        let len = suffix.chars().count() as isize;
        if len > self.k + 1 {
            return false;
        }
        let start = (self.k + 1 - len) as usize;
        if !self.b[start..=self.k as usize].iter().copied().eq(suffix.chars()) {
            return false;
        }
        self.j = self.k - len;
        true
    }

    fn set_to(&mut self, s: &str) {
        let start = (self.j + 1) as usize;
        self.b.truncate(start);
        self.b.extend(s.chars());
        self.k = self.j + s.chars().count() as isize;
    }

    fn replace_if_measured(&mut self, s: &str) {
        if self.m() > 0 {
            self.set_to(s);
        }
    }

    /// Try each `(suffix, replacement)` in order; the first suffix that matches
    /// is replaced when the remaining stem has a positive measure.
    fn apply_first(&mut self, rules: &[(&str, &str)]) {
        for (suffix, replacement) in rules {
            if self.ends(suffix) {
                self.replace_if_measured(replacement);
                return;
            }
        }
    }

    /// Plurals and -ed / -ing.
    fn step1ab(&mut self) {
        if self.at(self.k) == 's' {
            if self.ends("sses") {
                self.k -= 2;
            } else if self.ends("ies") {
                self.set_to("i");
            } else if self.at(self.k - 1) != 's' {
                self.k -= 1;
            }
        }
        if self.ends("eed") {
            if self.m() > 0 {
                self.k -= 1;
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.k = self.j;
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_consonant(self.k) {
                self.k -= 1;
                if matches!(self.at(self.k), 'l' | 's' | 'z') {
                    self.k += 1;
                }
            } else if self.m() == 1 && self.cvc(self.k) {
                self.set_to("e");
            }
        }
    }

    /// Terminal y to i when there is another vowel in the stem.
    fn step1c(&mut self) {
        if self.ends("y") && self.vowel_in_stem() {
            let k = self.k as usize;
            self.b[k] = 'i';
        }
    }

    /// Double suffixes to single ones, e.g. -ization to -ize.
    fn step2(&mut self) {
        if self.k == 0 {
            return;
        }
        match self.at(self.k - 1) {
            'a' => self.apply_first(&[("ational", "ate"), ("tional", "tion")]),
            'c' => self.apply_first(&[("enci", "ence"), ("anci", "ance")]),
            'e' => self.apply_first(&[("izer", "ize")]),
            'l' => self.apply_first(&[("bli", "ble"), ("alli", "al"), ("entli", "ent"), ("eli", "e"), ("ousli", "ous")]),
            'o' => self.apply_first(&[("ization", "ize"), ("ation", "ate"), ("ator", "ate")]),
            's' => self.apply_first(&[("alism", "al"), ("iveness", "ive"), ("fulness", "ful"), ("ousness", "ous")]),
            't' => self.apply_first(&[("aliti", "al"), ("iviti", "ive"), ("biliti", "ble")]),
            'g' => self.apply_first(&[("logi", "log")]),
            _ => {}
        }
    }

    /// -ic-, -full, -ness and friends.
    fn step3(&mut self) {
        match self.at(self.k) {
            'e' => self.apply_first(&[("icate", "ic"), ("ative", ""), ("alize", "al")]),
            'i' => self.apply_first(&[("iciti", "ic")]),
            'l' => self.apply_first(&[("ical", "ic"), ("ful", "")]),
            's' => self.apply_first(&[("ness", "")]),
            _ => {}
        }
    }

    /// Drop -ant, -ence etc. in context <c>vcvc<v>.
    fn step4(&mut self) {
        if self.k == 0 {
            return;
        }
        let matched = match self.at(self.k - 1) {
            'a' => self.ends("al"),
            'c' => self.ends("ance") || self.ends("ence"),
            'e' => self.ends("er"),
            'i' => self.ends("ic"),
            'l' => self.ends("able") || self.ends("ible"),
            'n' => self.ends("ant") || self.ends("ement") || self.ends("ment") || self.ends("ent"),
            'o' => (self.ends("ion") && self.j >= 0 && matches!(self.at(self.j), 's' | 't')) || self.ends("ou"),
            's' => self.ends("ism"),
            't' => self.ends("ate") || self.ends("iti"),
            'u' => self.ends("ous"),
            'v' => self.ends("ive"),
            'z' => self.ends("ize"),
            _ => false,
        };
        if matched && self.m() > 1 {
            self.k = self.j;
        }
    }

    /// Remove a final -e and reduce -ll when the measure allows.
    fn step5(&mut self) {
        self.j = self.k;
        if self.at(self.k) == 'e' {
            let a = self.m();
            if a > 1 || (a == 1 && !self.cvc(self.k - 1)) {
                self.k -= 1;
            }
        }
        if self.at(self.k) == 'l' && self.double_consonant(self.k) && self.m() > 1 {
            self.k -= 1;
        }
    }
}
