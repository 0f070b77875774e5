use crate::models::User;
use std::collections::HashSet;

/// Skills that can flow in each direction between a subject and a candidate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exchange {
    /// subject.needed ∩ candidate.offered, in subject.needed order
    pub can_learn: Vec<String>,
    /// subject.offered ∩ candidate.needed, in candidate.needed order
    pub can_teach: Vec<String>,
}

impl Exchange {
    /// Both sides gain at least one skill
    #[inline]
    pub fn is_mutual(&self) -> bool {
        !self.can_learn.is_empty() && !self.can_teach.is_empty()
    }

    /// Total number of exchange opportunities
    #[inline]
    pub fn opportunity_count(&self) -> usize {
        self.can_learn.len() + self.can_teach.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.can_learn.is_empty() && self.can_teach.is_empty()
    }
}

/// Skills in `needed` that appear in `offered`
///
/// Ordered by `needed` and duplicate-free. Ordering by the needing side
/// makes `can_learn(S, C)` and `can_teach(C, S)` the same sequence.
pub fn shared_skills(needed: &[String], offered: &[String]) -> Vec<String> {
    if needed.is_empty() || offered.is_empty() {
        return Vec::new();
    }

    let offered: HashSet<&str> = offered.iter().map(String::as_str).collect();
    let mut emitted: HashSet<&str> = HashSet::new();

    needed
        .iter()
        .filter_map(|skill| {
            let skill = skill.as_str();
            (offered.contains(skill) && emitted.insert(skill)).then(|| skill.to_string())
        })
        .collect()
}

/// Compute the exchange between `subject` and `candidate`
pub fn compute_exchange(subject: &User, candidate: &User) -> Exchange {
    Exchange {
        can_learn: shared_skills(&subject.skills_needed, &candidate.skills_offered),
        can_teach: shared_skills(&candidate.skills_needed, &subject.skills_offered),
    }
}
