use crate::core::exchange::Exchange;
use crate::models::ScoringWeights;

/// Calculate the compatibility score for an exchange
///
/// Scoring formula:
/// score = (
///     |can_learn| * learn +        # Skills the subject can pick up
///     |can_teach| * teach +        # Skills the subject can pass on
///     mutual_bonus                 # Only when both lists are non-empty
/// )
///
/// With positive weights an empty exchange scores exactly 0, every extra
/// opportunity raises the score, and a mutual exchange outranks a one-way
/// exchange with the same opportunity count.
pub fn calculate_match_score(exchange: &Exchange, weights: &ScoringWeights) -> f64 {
    let learn_score = exchange.can_learn.len() as f64 * weights.learn;
    let teach_score = exchange.can_teach.len() as f64 * weights.teach;
    let mutual_score = if exchange.is_mutual() {
        weights.mutual_bonus
    } else {
        0.0
    };

    (learn_score + teach_score + mutual_score).max(0.0)
}
