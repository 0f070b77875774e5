use crate::core::{exchange::compute_exchange, scoring::calculate_match_score};
use crate::models::{MatchResult, ScoringWeights, User, UserId};
use thiserror::Error;

/// Errors raised by the match engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("User {0} not found")]
    NotFound(UserId),

    #[error("User {0} cannot be matched with themselves")]
    SelfMatch(UserId),
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Resolve the subject in the population snapshot
/// 2. Skip the subject itself
/// 3. Compute the skill exchange with every candidate
/// 4. Score, drop zero scores, and rank
///
/// The matcher only holds weights; it never mutates the population and can
/// be shared freely between concurrent requests.
#[derive(Debug, Clone)]
pub struct Matcher {
    weights: ScoringWeights,
}

impl Matcher {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Find exchange partners for a user
    ///
    /// # Arguments
    /// * `subject_id` - The user to find matches for
    /// * `population` - Snapshot of every user, subject included
    ///
    /// # Returns
    /// Candidates with a positive score, sorted by score (descending) then
    /// user id (ascending). An empty vec means the subject exists but
    /// nobody can exchange with them.
    pub fn find_matches(
        &self,
        subject_id: UserId,
        population: &[User],
    ) -> Result<Vec<MatchResult>, MatchError> {
        let subject = find_user(population, subject_id)?;

        let mut matches: Vec<MatchResult> = population
            .iter()
            .filter(|candidate| candidate.user_id != subject.user_id)
            .filter_map(|candidate| {
                let exchange = compute_exchange(subject, candidate);
                let score = calculate_match_score(&exchange, &self.weights);

                if score > 0.0 {
                    let mutual = exchange.is_mutual();
                    Some(MatchResult {
                        user: candidate.clone(),
                        score,
                        can_learn: exchange.can_learn,
                        can_teach: exchange.can_teach,
                        mutual,
                    })
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.user.user_id.cmp(&b.user.user_id))
        });

        tracing::debug!(
            "Scored {} candidates for user {}, {} matches",
            population.len().saturating_sub(1),
            subject_id,
            matches.len()
        );

        Ok(matches)
    }

    /// Exchange details between two specific users
    ///
    /// Unlike `find_matches`, a pair with no overlap is still returned, with
    /// a score of 0.
    pub fn match_details(
        &self,
        subject_id: UserId,
        candidate_id: UserId,
        population: &[User],
    ) -> Result<MatchResult, MatchError> {
        if subject_id == candidate_id {
            return Err(MatchError::SelfMatch(subject_id));
        }

        let subject = find_user(population, subject_id)?;
        let candidate = find_user(population, candidate_id)?;

        let exchange = compute_exchange(subject, candidate);
        let score = calculate_match_score(&exchange, &self.weights);
        let mutual = exchange.is_mutual();

        Ok(MatchResult {
            user: candidate.clone(),
            score,
            can_learn: exchange.can_learn,
            can_teach: exchange.can_teach,
            mutual,
        })
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

fn find_user(population: &[User], user_id: UserId) -> Result<&User, MatchError> {
    population
        .iter()
        .find(|user| user.user_id == user_id)
        .ok_or(MatchError::NotFound(user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_user(id: i64, offered: &[&str], needed: &[&str]) -> User {
        User {
            user_id: id,
            name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            skills_offered: offered.iter().map(|s| s.to_string()).collect(),
            skills_needed: needed.iter().map(|s| s.to_string()).collect(),
            location: None,
            bio: None,
            created_at: Utc::now(),
        }
    }

    fn create_population() -> Vec<User> {
        vec![
            create_user(1, &["go", "rust"], &["python"]),
            create_user(2, &["python"], &["go"]),
            create_user(3, &["java"], &["java"]),
        ]
    }

    #[test]
    fn test_find_matches_basic() {
        let matcher = Matcher::with_default_weights();
        let population = create_population();

        let matches = matcher.find_matches(1, &population).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user.user_id, 2);
        assert_eq!(matches[0].can_learn, vec!["python"]);
        assert_eq!(matches[0].can_teach, vec!["go"]);
        assert!(matches[0].mutual);
        assert!(matches[0].score > 0.0);
    }

    #[test]
    fn test_unknown_subject() {
        let matcher = Matcher::with_default_weights();
        let population = create_population();

        assert_eq!(
            matcher.find_matches(999, &population),
            Err(MatchError::NotFound(999))
        );
    }

    #[test]
    fn test_no_overlap_yields_empty_list() {
        let matcher = Matcher::with_default_weights();
        let population = create_population();

        let matches = matcher.find_matches(3, &population).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_subject_never_matches_itself() {
        let matcher = Matcher::with_default_weights();
        // Offers exactly what it needs
        let population = vec![
            create_user(1, &["go"], &["go"]),
            create_user(2, &["go"], &[]),
        ];

        let matches = matcher.find_matches(1, &population).unwrap();
        assert!(matches.iter().all(|m| m.user.user_id != 1));
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_matches_sorted_by_score() {
        let matcher = Matcher::with_default_weights();
        let population = vec![
            create_user(1, &["go", "rust"], &["python", "sql"]),
            create_user(2, &["python"], &[]),              // learn 1
            create_user(3, &["python", "sql"], &["rust"]), // learn 2, teach 1, mutual
            create_user(4, &["sql"], &["go"]),             // learn 1, teach 1, mutual
        ];

        let matches = matcher.find_matches(1, &population).unwrap();
        let ids: Vec<i64> = matches.iter().map(|m| m.user.user_id).collect();

        assert_eq!(ids, vec![3, 4, 2]);
        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_ties_broken_by_user_id() {
        let matcher = Matcher::with_default_weights();
        let population = vec![
            create_user(10, &[], &["python"]),
            create_user(30, &["python"], &[]),
            create_user(20, &["python"], &[]),
            create_user(5, &["python"], &[]),
        ];

        let matches = matcher.find_matches(10, &population).unwrap();
        let ids: Vec<i64> = matches.iter().map(|m| m.user.user_id).collect();

        assert_eq!(ids, vec![5, 20, 30]);
    }

    #[test]
    fn test_repeated_calls_identical() {
        let matcher = Matcher::with_default_weights();
        let population = create_population();

        let first = matcher.find_matches(2, &population).unwrap();
        let second = matcher.find_matches(2, &population).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_match_details_includes_zero_score_pairs() {
        let matcher = Matcher::with_default_weights();
        let population = create_population();

        let details = matcher.match_details(1, 3, &population).unwrap();
        assert_eq!(details.user.user_id, 3);
        assert_eq!(details.score, 0.0);
        assert!(!details.mutual);
    }

    #[test]
    fn test_match_details_errors() {
        let matcher = Matcher::with_default_weights();
        let population = create_population();

        assert_eq!(
            matcher.match_details(1, 1, &population),
            Err(MatchError::SelfMatch(1))
        );
        assert_eq!(
            matcher.match_details(1, 42, &population),
            Err(MatchError::NotFound(42))
        );
    }
}
