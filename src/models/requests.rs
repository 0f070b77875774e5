use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::core::normalizer::{canonical_skills, normalize_skills};
use crate::models::domain::NewUser;

/// Skill list as sent by clients
///
/// Either raw comma-separated text (`"rust, go"`) or an array of strings
/// (`["rust", "go"]`). Array elements go through the same normalization, so
/// an element may itself contain commas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillInput {
    Text(String),
    List(Vec<String>),
}

impl SkillInput {
    pub fn into_skills(self) -> Vec<String> {
        match self {
            SkillInput::Text(raw) => normalize_skills(Some(&raw)),
            SkillInput::List(items) => items
                .iter()
                .flat_map(|item| normalize_skills(Some(item)))
                .collect(),
        }
    }
}

/// Request body for creating or fully replacing a user
///
/// `name` and `email` default to empty so that a missing field is reported
/// as a validation error instead of a JSON decoding error.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Valid email is required")
    )]
    pub email: String,
    #[serde(default)]
    pub skills_offered: Option<SkillInput>,
    #[serde(default)]
    pub skills_needed: Option<SkillInput>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl CreateUserRequest {
    /// Trim, validate and normalize into a storable payload
    pub fn into_new_user(mut self) -> Result<NewUser, ValidationErrors> {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.validate()?;

        Ok(NewUser {
            name: self.name,
            email: self.email,
            skills_offered: canonical_skills(
                self.skills_offered.map(SkillInput::into_skills).unwrap_or_default(),
            ),
            skills_needed: canonical_skills(
                self.skills_needed.map(SkillInput::into_skills).unwrap_or_default(),
            ),
            location: non_blank(self.location),
            bio: non_blank(self.bio),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// First user-facing message, checking `name` before `email`
pub fn validation_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    for field in ["name", "email"] {
        let message = field_errors
            .get(field)
            .and_then(|errs| errs.iter().find_map(|e| e.message.as_ref()));
        if let Some(message) = message {
            return message.to_string();
        }
    }
    errors.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            skills_offered: None,
            skills_needed: None,
            location: None,
            bio: None,
        }
    }

    #[test]
    fn test_text_and_list_inputs_normalize_alike() {
        let text: SkillInput = serde_json::from_str(r#"" rust, ,go ,""#).unwrap();
        let list: SkillInput = serde_json::from_str(r#"["rust ", "", "go"]"#).unwrap();

        assert_eq!(text.into_skills(), vec!["rust", "go"]);
        assert_eq!(list.into_skills(), vec!["rust", "go"]);
    }

    #[test]
    fn test_list_elements_are_split_on_commas() {
        let list = SkillInput::List(vec!["a, b".to_string(), "c".to_string()]);
        assert_eq!(list.into_skills(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let req: CreateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(req.name.is_empty());
        assert!(req.skills_offered.is_none());
    }

    #[test]
    fn test_blank_name_rejected() {
        let errors = request("   ", "ada@example.com").into_new_user().unwrap_err();
        assert_eq!(validation_message(&errors), "Name is required");
    }

    #[test]
    fn test_missing_email_rejected() {
        let errors = request("Ada", "").into_new_user().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_invalid_email_rejected() {
        let errors = request("Ada", "not-an-email").into_new_user().unwrap_err();
        assert_eq!(validation_message(&errors), "Valid email is required");
    }

    #[test]
    fn test_skills_deduplicated_on_ingestion() {
        let mut req = request(" Ada ", "ada@example.com");
        req.skills_offered = Some(SkillInput::Text("rust, go, rust".to_string()));
        req.bio = Some("   ".to_string());

        let new_user = req.into_new_user().unwrap();
        assert_eq!(new_user.name, "Ada");
        assert_eq!(new_user.skills_offered, vec!["rust", "go"]);
        assert!(new_user.skills_needed.is_empty());
        assert_eq!(new_user.bio, None);
    }
}
