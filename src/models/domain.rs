use serde::{Deserialize, Serialize};

/// Store-assigned user identifier
pub type UserId = i64;

/// Directory member with the skills they teach and want to learn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub skills_offered: Vec<String>,
    #[serde(default)]
    pub skills_needed: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// Build a stored user from a validated payload
    pub fn from_new(
        user_id: UserId,
        new_user: NewUser,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            user_id,
            name: new_user.name,
            email: new_user.email,
            skills_offered: new_user.skills_offered,
            skills_needed: new_user.skills_needed,
            location: new_user.location,
            bio: new_user.bio,
            created_at,
        }
    }
}

/// Validated, normalized user payload used for creation and full replacement
///
/// Skill lists are already canonical: trimmed, non-empty and duplicate-free.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub skills_offered: Vec<String>,
    pub skills_needed: Vec<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

/// A candidate the subject can exchange skills with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub user: User,
    pub score: f64,
    /// Skills the subject wants that the candidate offers
    pub can_learn: Vec<String>,
    /// Skills the subject offers that the candidate wants
    pub can_teach: Vec<String>,
    pub mutual: bool,
}

/// Scoring weights
///
/// All three must be strictly positive for the ranking guarantees to hold:
/// a strict superset of exchange opportunities always scores higher, and a
/// mutual exchange never ranks below a one-way exchange of the same size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub learn: f64,
    pub teach: f64,
    pub mutual_bonus: f64,
}

impl ScoringWeights {
    pub fn is_valid(&self) -> bool {
        [self.learn, self.teach, self.mutual_bonus]
            .iter()
            .all(|w| w.is_finite() && *w > 0.0)
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            learn: 1.0,
            teach: 1.0,
            mutual_bonus: 2.0,
        }
    }
}
