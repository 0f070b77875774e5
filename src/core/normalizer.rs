use std::collections::HashSet;

/// Turn comma-separated free text into skill identifiers
///
/// Each segment is trimmed and empty segments are dropped, so trailing or
/// doubled commas never produce a blank skill. Order is preserved and
/// duplicates are kept; case is left untouched.
///
/// # Examples
/// ```
/// use skill_match::core::normalize_skills;
///
/// assert_eq!(normalize_skills(Some(" a, ,b ,")), vec!["a", "b"]);
/// assert!(normalize_skills(None).is_empty());
/// ```
pub fn normalize_skills(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drop repeated skills, keeping the first occurrence
///
/// Applied once when a user is stored, so persisted skill lists behave as
/// ordered sets.
pub fn canonical_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(skills.len());
    skills
        .into_iter()
        .filter(|skill| seen.insert(skill.clone()))
        .collect()
}
