use crate::error::{Error, Result};
use crate::DocName;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A document's raw frequency for one term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub doc: DocName,
    pub tf: u32,
}

/// `ln(N / (df + 1))`. The +1 keeps the value finite for terms in every document.
pub fn compute_idf(document_frequency: usize, num_docs: usize) -> f64 {
    (num_docs as f64 / (document_frequency as f64 + 1.0)).ln()
}

/// How IDF values are rounded to three decimals in the persisted index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdfRounding {
    /// Always round toward positive infinity. Matches existing index files bit for bit.
    #[default]
    Ceiling,
    /// Round half away from zero.
    Nearest,
}

impl IdfRounding {
    pub fn round(self, idf: f64) -> f64 {
        let scaled = idf * 1000.0;
        let rounded = match self {
            IdfRounding::Ceiling => scaled.ceil(),
            IdfRounding::Nearest => scaled.round(),
        };
        // adding zero turns -0.0 into 0.0
        rounded / 1000.0 + 0.0
    }

    pub fn format(self, idf: f64) -> String {
        format!("{:.3}", self.round(idf))
    }
}

impl fmt::Display for IdfRounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdfRounding::Ceiling => "ceiling",
            IdfRounding::Nearest => "nearest",
        })
    }
}

impl FromStr for IdfRounding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ceiling" => Ok(IdfRounding::Ceiling),
            "nearest" => Ok(IdfRounding::Nearest),
            other => Err(format!("unknown idf rounding '{other}' (expected ceiling or nearest)")),
        }
    }
}

/// One line of the persisted index: `term,doc1,tf1,doc2,tf2,...,idf`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
    pub term: String,
    pub postings: Vec<Posting>,
    pub idf: f64,
}

impl IndexEntry {
    /// The order of the entries' serialized lines. Terms never contain commas,
    /// so comparing `term,` decides it; "new york" sorts before "new".
    pub fn line_order(a: &IndexEntry, b: &IndexEntry) -> Ordering {
        fn key(e: &IndexEntry) -> impl Iterator<Item = u8> + '_ {
            e.term.bytes().chain(std::iter::once(b','))
        }
        key(a).cmp(key(b))
    }

    pub fn to_line(&self, rounding: IdfRounding) -> String {
        let mut line = self.term.clone();
        for p in &self.postings {
            line.push(',');
            line.push_str(&p.doc);
            line.push(',');
            line.push_str(&p.tf.to_string());
        }
        line.push(',');
        line.push_str(&rounding.format(self.idf));
        line
    }

    /// Parse one index line. `line_no` is 1-based and only used in errors.
    ///
    /// Posting fields are read positionally as `(doc, tf)` pairs, so a
    /// document name that is a substring of another is never confused with it.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let malformed = |reason: String| Error::MalformedIndexLine { line: line_no, reason };
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 4 || fields.len() % 2 != 0 {
            return Err(malformed(format!("expected term,(doc,count)+,idf but found {} fields", fields.len())));
        }
        let term = fields[0];
        if term.is_empty() {
            return Err(malformed("empty term".into()));
        }
        let last = fields.len() - 1;
        let idf: f64 = fields[last]
            .trim()
            .parse()
            .map_err(|_| malformed(format!("idf '{}' is not a number", fields[last])))?;
        let postings = fields[1..last]
            .chunks(2)
            .map(|pair| {
                let (doc, tf) = (pair[0], pair[1]);
                if doc.is_empty() {
                    return Err(malformed("empty document name".into()));
                }
                let tf = tf.parse().map_err(|_| malformed(format!("count '{tf}' for {doc} is not an integer")))?;
                Ok(Posting { doc: doc.to_string(), tf })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { term: term.to_string(), postings, idf })
    }
}

/// Term → document → raw frequency. Postings stay in document-name order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InvertedIndex {
    terms: BTreeMap<String, BTreeMap<DocName, u32>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every term occurrence against `doc`.
    pub fn index_document<I, S>(&mut self, doc: &str, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let postings = self.terms.entry(term.as_ref().to_string()).or_default();
            match postings.get_mut(doc) {
                Some(tf) => *tf += 1,
                None => {
                    postings.insert(doc.to_string(), 1);
                }
            }
        }
    }

    /// Fold another partial index into this one. Order of merges does not matter.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (term, postings) in other.terms {
            let mine = self.terms.entry(term).or_default();
            for (doc, tf) in postings {
                *mine.entry(doc).or_insert(0) += tf;
            }
        }
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn postings(&self, term: &str) -> Option<&BTreeMap<DocName, u32>> {
        self.terms.get(term)
    }

    pub fn document_frequency(&self, term: &str) -> usize {
        self.terms.get(term).map_or(0, BTreeMap::len)
    }

    /// Total occurrences recorded for `doc` across all terms.
    pub fn document_length(&self, doc: &str) -> u32 {
        self.terms.values().filter_map(|p| p.get(doc)).sum()
    }

    /// Index entries in term order with IDF computed against `num_docs`.
    pub fn entries(&self, num_docs: usize) -> impl Iterator<Item = IndexEntry> + '_ {
        self.terms.iter().map(move |(term, postings)| IndexEntry {
            term: term.clone(),
            postings: postings.iter().map(|(doc, tf)| Posting { doc: doc.clone(), tf: *tf }).collect(),
            idf: compute_idf(postings.len(), num_docs),
        })
    }
}
