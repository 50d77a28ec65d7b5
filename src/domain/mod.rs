//! Domain name normalization.
//!
//! Turns raw input lines into the canonical form used for queries, checkpoint
//! entries and output rows: trimmed, lower-cased, IDNA-encoded (punycode),
//! without the trailing root dot.

use thiserror::Error;

const MAX_NAME_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

/// Reasons an input line is not a usable domain name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Nothing left after trimming.
    #[error("empty domain name")]
    Empty,

    /// IDNA/host parsing failed.
    #[error("'{0}' is not a valid host name")]
    Unparseable(String),

    /// The input is an IP address literal.
    #[error("'{0}' is an IP address, not a domain name")]
    IpAddress(String),

    /// Single-label names cannot be delegated zones.
    #[error("'{0}' has no dot; expected a fully-qualified domain name")]
    NotQualified(String),

    /// Name or label length exceeds DNS limits.
    #[error("'{0}' exceeds DNS length limits")]
    TooLong(String),

    /// A label is empty, starts/ends with a hyphen or holds other characters.
    #[error("'{0}' contains an invalid label")]
    InvalidLabel(String),
}

/// Normalizes a raw domain name.
///
/// # Errors
///
/// Returns a `DomainError` when the result would not be a syntactically valid,
/// fully-qualified host name.
pub fn normalize_domain(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(DomainError::Empty);
    }

    let ascii = match url::Host::parse(trimmed) {
        Ok(url::Host::Domain(domain)) => domain.to_ascii_lowercase(),
        Ok(url::Host::Ipv4(_)) | Ok(url::Host::Ipv6(_)) => {
            return Err(DomainError::IpAddress(trimmed.to_string()))
        }
        Err(_) => return Err(DomainError::Unparseable(trimmed.to_string())),
    };

    if ascii.len() > MAX_NAME_LENGTH {
        return Err(DomainError::TooLong(ascii));
    }
    if !ascii.contains('.') {
        return Err(DomainError::NotQualified(ascii));
    }
    for label in ascii.split('.') {
        if label.len() > MAX_LABEL_LENGTH {
            return Err(DomainError::TooLong(ascii.clone()));
        }
        if !is_valid_label(label) {
            return Err(DomainError::InvalidLabel(ascii.clone()));
        }
    }

    Ok(ascii)
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
