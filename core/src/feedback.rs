//! Relevance feedback.
//!
//! After each ranking the caller's [`RelevanceJudge`] marks every shown
//! document relevant or not. The query moves toward both centroids:
//! `q' = q + w_r * centroid(relevant) + w_n * centroid(non_relevant)`.
//! The non-relevant centroid is added rather than subtracted, unlike the
//! textbook Rocchio formula.

use crate::config::FeedbackWeights;
use crate::error::Result;
use crate::search::{Ranking, ScoredDocument, Searcher};

/// Coordinate-wise mean. No vectors gives the zero vector.
pub fn centroid(vectors: &[&[f64]], dimension: usize) -> Vec<f64> {
    let mut sum = vec![0.0; dimension];
    if vectors.is_empty() {
        return sum;
    }
    for v in vectors {
        for (acc, x) in sum.iter_mut().zip(v.iter()) {
            *acc += x;
        }
    }
    let n = vectors.len() as f64;
    sum.iter_mut().for_each(|x| *x /= n);
    sum
}

/// Apply one round of feedback. `judged` pairs a shown document's vector with its judgment.
pub fn refine_query(query: &[f64], judged: &[(&[f64], bool)], weights: FeedbackWeights) -> Vec<f64> {
    let relevant: Vec<&[f64]> = judged.iter().filter(|(_, r)| *r).map(|(v, _)| *v).collect();
    let non_relevant: Vec<&[f64]> = judged.iter().filter(|(_, r)| !*r).map(|(v, _)| *v).collect();
    let rel = centroid(&relevant, query.len());
    let non = centroid(&non_relevant, query.len());
    query
        .iter()
        .zip(rel.iter().zip(&non))
        .map(|(q, (r, n))| q + weights.relevant * r + weights.non_relevant * n)
        .collect()
}

/// The session's window to the user: shows rankings and collects judgments.
pub trait RelevanceJudge {
    fn show(&mut self, ranking: &Ranking) -> Result<()>;
    /// Whether to run another feedback round over `ranking`.
    fn wants_feedback(&mut self, ranking: &Ranking) -> Result<bool>;
    fn is_relevant(&mut self, hit: &ScoredDocument) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub rounds: usize,
    pub query: Vec<f64>,
    pub last: Ranking,
}

/// Rank, show, and refine until the judge declines or nothing matches.
pub fn run_feedback_loop<J>(
    searcher: &Searcher,
    mut query: Vec<f64>,
    k: usize,
    weights: FeedbackWeights,
    judge: &mut J,
) -> Result<SessionOutcome>
where
    J: RelevanceJudge + ?Sized,
{
    let mut rounds = 0;
    loop {
        let ranking = searcher.rank(&query, k);
        judge.show(&ranking)?;
        if ranking.is_empty() || !judge.wants_feedback(&ranking)? {
            return Ok(SessionOutcome { rounds, query, last: ranking });
        }
        let mut judged = Vec::with_capacity(ranking.hits.len());
        for hit in &ranking.hits {
            let relevant = judge.is_relevant(hit)?;
            if let Some(vector) = searcher.document_vector(&hit.document) {
                judged.push((vector, relevant));
            }
        }
        query = refine_query(&query, &judged, weights);
        rounds += 1;
        tracing::debug!(rounds, judged = judged.len(), "refined query");
    }
}
