use userhub_core::{DomainError, DomainResult};

/// Base of a generated username: the last name part followed by the initials
/// of every other part, uppercased.
///
/// `"Nguyen Ngoc Anh"` → `"ANHNN"`. The directory appends a sequence number.
pub fn username_base(full_name: &str) -> DomainResult<String> {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    let Some((last, rest)) = parts.split_last() else {
        return Err(DomainError::validation("full name must not be empty"));
    };
    if rest.is_empty() {
        return Err(DomainError::validation(
            "full name must have at least two parts",
        ));
    }

    let mut base = last.to_uppercase();
    for part in rest {
        if let Some(initial) = part.chars().next() {
            base.extend(initial.to_uppercase());
        }
    }
    Ok(base)
}

/// `base` followed by a 1-based sequence number.
pub fn numbered(base: &str, sequence: u64) -> String {
    format!("{base}{sequence}")
}
