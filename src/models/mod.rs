// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{MatchResult, NewUser, ScoringWeights, User, UserId};
pub use requests::{validation_message, CreateUserRequest, SkillInput};
pub use responses::{ErrorResponse, HealthResponse};
