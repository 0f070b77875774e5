//! Skill Match - matching service for a peer skill-exchange directory
//!
//! Users declare the skills they can teach and the skills they want to
//! learn. This library normalizes those skill lists, stores users, and ranks
//! the other users a given member can exchange skills with.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{normalize_skills, MatchError, Matcher};
pub use error::AppError;
pub use models::{MatchResult, NewUser, ScoringWeights, User, UserId};
