//! Input rules for free text and usernames.
//!
//! Text is made inert before it is persisted: markup characters are escaped
//! to HTML entities, so a stored value can be dropped into a page as-is.

use crate::error::DomainError;

/// Maximum title length, counted in characters of the trimmed input.
pub const TITLE_MAX_CHARS: usize = 255;
/// Maximum description length, counted in characters of the trimmed input.
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const USERNAME_MAX_CHARS: usize = 64;
pub const PASSWORD_MAX_CHARS: usize = 128;

/// Trim, drop control characters (newline and tab survive) and escape markup.
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.trim().chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '\n' | '\t' => out.push(ch),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Validate and sanitize a task title.
pub fn clean_title(title: &str) -> Result<String, DomainError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("Title must not be empty"));
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(sanitize_text(trimmed))
}

/// Validate and sanitize an optional task description.
///
/// A blank description is stored as `None`.
pub fn clean_description(description: Option<&str>) -> Result<Option<String>, DomainError> {
    let Some(trimmed) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(DomainError::validation(format!(
            "Description must be at most {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok(Some(sanitize_text(trimmed)))
}

/// Usernames are identifiers, so they are rejected rather than escaped.
pub fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.is_empty() {
        return Err(DomainError::validation("Username must not be empty"));
    }
    if username.chars().count() > USERNAME_MAX_CHARS {
        return Err(DomainError::validation(format!(
            "Username must be at most {USERNAME_MAX_CHARS} characters"
        )));
    }
    if username
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '&' | '"' | '\''))
    {
        return Err(DomainError::validation(
            "Username contains invalid characters",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.is_empty() {
        return Err(DomainError::validation("Password must not be empty"));
    }
    if password.chars().count() > PASSWORD_MAX_CHARS {
        return Err(DomainError::validation(format!(
            "Password must be at most {PASSWORD_MAX_CHARS} characters"
        )));
    }
    Ok(())
}
