use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{ScoredMatch, SimilarityQuery};

/// Cosine similarity of two vectors.
///
/// `None` when the lengths differ, either vector is empty, or either has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0_f64, 0.0_f64, 0.0_f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    let score = (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32;
    score.is_finite().then_some(score)
}

/// Scores every candidate against `query` and keeps those at or above the
/// threshold and on or after `min_date`, best first. Equal scores fall back to ascending id so the
/// same inputs always produce the same order.
pub fn rank<'a, I>(query: &[f32], candidates: I, options: &SimilarityQuery) -> Vec<ScoredMatch>
where
    I: IntoIterator<Item = (Uuid, NaiveDate, &'a [f32])>,
{
    let mut matches: Vec<ScoredMatch> = candidates
        .into_iter()
        .filter(|(_, date, _)| options.min_date.is_none_or(|min| *date >= min))
        .filter_map(|(id, _, embedding)| {
            cosine_similarity(query, embedding)
                .filter(|score| *score >= options.threshold)
                .map(|score| ScoredMatch { id, score })
        })
        .collect();

    matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

    if let Some(limit) = options.limit {
        matches.truncate(limit);
    }

    matches
}
