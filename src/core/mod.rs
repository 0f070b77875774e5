// Core algorithm exports
pub mod exchange;
pub mod matcher;
pub mod normalizer;
pub mod scoring;

pub use exchange::{compute_exchange, shared_skills, Exchange};
pub use matcher::{MatchError, Matcher};
pub use normalizer::{canonical_skills, normalize_skills};
pub use scoring::calculate_match_score;
