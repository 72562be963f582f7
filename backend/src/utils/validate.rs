use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{
    ABOUT_CHAR_LIMIT, MAX_PROFILE_AGE, MAX_SKILLS, MIN_NAME_LENGTH, MIN_PROFILE_AGE,
};
use crate::errors::{CoreError, CoreResult};
use crate::models::{NewProfile, ProfilePatch};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid"));

pub fn validate_email(email: &str) -> CoreResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(CoreError::validation("email", "not a valid address"))
    }
}

pub fn validate_name(field: &'static str, value: &str) -> CoreResult<()> {
    if value.trim().chars().count() < MIN_NAME_LENGTH {
        return Err(CoreError::validation(
            field,
            format!("must be at least {MIN_NAME_LENGTH} characters"),
        ));
    }
    Ok(())
}

pub fn validate_age(age: i32) -> CoreResult<()> {
    if !(MIN_PROFILE_AGE..=MAX_PROFILE_AGE).contains(&age) {
        return Err(CoreError::validation(
            "age",
            format!("must be between {MIN_PROFILE_AGE} and {MAX_PROFILE_AGE}"),
        ));
    }
    Ok(())
}

pub fn validate_about(about: &str) -> CoreResult<()> {
    if about.chars().count() > ABOUT_CHAR_LIMIT {
        return Err(CoreError::validation(
            "about",
            format!("must be at most {ABOUT_CHAR_LIMIT} characters"),
        ));
    }
    Ok(())
}

/// Canonicalizes a skills list into an ordered set of trimmed strings.
/// Duplicates collapse to their first occurrence; an entry that is empty
/// after trimming is malformed input, not something to normalize away.
pub fn normalize_skills(skills: Vec<String>) -> CoreResult<Vec<String>> {
    if skills.len() > MAX_SKILLS {
        return Err(CoreError::validation(
            "skills",
            format!("at most {MAX_SKILLS} skills allowed"),
        ));
    }
    let mut normalized: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            return Err(CoreError::validation("skills", "empty skill name"));
        }
        if !normalized.iter().any(|s| s == trimmed) {
            normalized.push(trimmed.to_string());
        }
    }
    Ok(normalized)
}

/// Field-level checks for a profile patch. Skills are normalized separately
/// so the caller can persist the canonical form.
pub fn validate_patch(patch: &ProfilePatch) -> CoreResult<()> {
    if let Some(first_name) = &patch.first_name {
        validate_name("firstName", first_name)?;
    }
    if let Some(last_name) = &patch.last_name {
        validate_name("lastName", last_name)?;
    }
    if let Some(age) = patch.age {
        validate_age(age)?;
    }
    if let Some(about) = &patch.about {
        validate_about(about)?;
    }
    Ok(())
}

/// Creation-time checks for a provisioned profile.
pub fn validate_new_profile(profile: &NewProfile) -> CoreResult<()> {
    validate_name("firstName", &profile.first_name)?;
    validate_name("lastName", &profile.last_name)?;
    validate_email(&profile.email)?;
    if let Some(age) = profile.age {
        validate_age(age)?;
    }
    if let Some(about) = &profile.about {
        validate_about(about)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("a.b+tag@sub.domain.org").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "no-at-sign", "two@@example.com ", "spaces in@it.com", "no@tld"] {
            assert!(validate_email(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn age_bounds_are_inclusive() {
        assert!(validate_age(18).is_ok());
        assert!(validate_age(100).is_ok());
        assert!(validate_age(17).is_err());
        assert!(validate_age(101).is_err());
    }

    #[test]
    fn short_names_are_rejected() {
        assert!(validate_name("firstName", "A").is_err());
        assert!(validate_name("firstName", " B ").is_err());
        assert!(validate_name("firstName", "Al").is_ok());
    }

    #[test]
    fn skills_are_trimmed_and_deduplicated_in_order() {
        let skills = vec![
            " rust ".to_string(),
            "sql".to_string(),
            "rust".to_string(),
        ];
        assert_eq!(normalize_skills(skills).unwrap(), vec!["rust", "sql"]);
    }

    #[test]
    fn blank_skill_is_an_error() {
        let err = normalize_skills(vec!["rust".into(), "  ".into()]).unwrap_err();
        assert!(matches!(
            err,
            crate::errors::CoreError::Validation { field: "skills", .. }
        ));
    }
}
