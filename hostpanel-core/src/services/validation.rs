//! Input validation and credential generation

use rand::Rng;

use hostpanel_provider::InternalUsername;

use crate::config::HostingPolicy;
use crate::error::{CoreError, CoreResult};
use crate::types::DomainChoice;

const SUBDOMAIN_LABEL_MIN: usize = 4;
const SUBDOMAIN_LABEL_MAX: usize = 16;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 20;
const REASON_MAX: usize = 255;
const LABEL_MAX: usize = 64;

const INTERNAL_USERNAME_LEN: usize = 8;
const GENERATED_PASSWORD_LEN: usize = 16;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const LOWER_DIGITS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn random_from(rng: &mut impl Rng, charset: &[u8]) -> char {
    char::from(charset[rng.random_range(0..charset.len())])
}

/// Fresh login username: 8 lowercase alphanumerics, starting with a letter.
#[must_use]
pub fn generate_internal_username() -> InternalUsername {
    let mut rng = rand::rng();
    let mut name = String::with_capacity(INTERNAL_USERNAME_LEN);
    name.push(random_from(&mut rng, LOWER));
    for _ in 1..INTERNAL_USERNAME_LEN {
        name.push(random_from(&mut rng, LOWER_DIGITS));
    }
    InternalUsername::new(name)
}

/// Fresh control-panel password: 16 ASCII alphanumerics.
#[must_use]
pub fn generate_password() -> String {
    let mut rng = rand::rng();
    (0..GENERATED_PASSWORD_LEN)
        .map(|_| random_from(&mut rng, ALPHANUMERIC))
        .collect()
}

/// Resolve a domain choice to the normalized FQDN, returning it with the
/// custom-domain flag.
pub fn resolve_domain(choice: &DomainChoice, policy: &HostingPolicy) -> CoreResult<(String, bool)> {
    match choice {
        DomainChoice::Subdomain { label, base } => {
            let label = validate_subdomain_label(label)?;
            let base = hostpanel_dns::normalize_host(base);
            if !policy.is_allowed_base(&base) {
                return Err(CoreError::InvalidDomain(format!(
                    "{base} is not an available base domain"
                )));
            }
            Ok((format!("{label}.{base}"), false))
        }
        DomainChoice::Custom { domain } => Ok((validate_custom_domain(domain)?, true)),
    }
}

/// 4 to 16 lowercase letters or digits.
pub fn validate_subdomain_label(label: &str) -> CoreResult<String> {
    let label = label.trim().to_ascii_lowercase();
    if !(SUBDOMAIN_LABEL_MIN..=SUBDOMAIN_LABEL_MAX).contains(&label.len()) {
        return Err(CoreError::InvalidDomain(format!(
            "subdomain must be {SUBDOMAIN_LABEL_MIN}-{SUBDOMAIN_LABEL_MAX} characters"
        )));
    }
    if !label.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()) {
        return Err(CoreError::InvalidDomain(
            "subdomain may only contain letters and digits".to_string(),
        ));
    }
    Ok(label)
}

/// IDNA-normalized domain with at least two labels.
pub fn validate_custom_domain(domain: &str) -> CoreResult<String> {
    let ascii = hostpanel_dns::validate_domain(domain)
        .map_err(|e| CoreError::InvalidDomain(e.to_string()))?;
    if hostpanel_dns::label_count(&ascii) < 2 {
        return Err(CoreError::InvalidDomain(format!(
            "{ascii} is not a fully qualified domain"
        )));
    }
    Ok(ascii)
}

/// 8 to 20 ASCII letters or digits.
///
/// The provider mishandles punctuation in passwords without reporting it.
pub fn validate_password(password: &str) -> CoreResult<()> {
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&password.len()) {
        return Err(CoreError::InvalidPassword(format!(
            "must be {PASSWORD_MIN}-{PASSWORD_MAX} characters"
        )));
    }
    if !password.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(CoreError::InvalidPassword(
            "only letters and digits are allowed".to_string(),
        ));
    }
    Ok(())
}

/// Deactivation reason: English text, i.e. printable ASCII, non-empty, at most 255 characters.
pub fn validate_reason(reason: &str) -> CoreResult<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(CoreError::InvalidReason("a reason is required".to_string()));
    }
    if reason.len() > REASON_MAX {
        return Err(CoreError::InvalidReason(format!(
            "must be at most {REASON_MAX} characters"
        )));
    }
    if !reason.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
        return Err(CoreError::InvalidReason(
            "please write the reason in English".to_string(),
        ));
    }
    Ok(reason.to_string())
}

/// Contact address passed to the provider; only its rough shape is checked.
pub fn validate_contact_email(email: &str) -> CoreResult<String> {
    let email = email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, host)| !local.is_empty() && host.contains('.') && !host.ends_with('.'));
    if !well_formed || email.chars().any(char::is_whitespace) {
        return Err(CoreError::ValidationError(format!(
            "invalid contact email: {email}"
        )));
    }
    Ok(email.to_string())
}

/// Optional free-text label, blank treated as absent.
pub fn validate_label(label: Option<&str>) -> CoreResult<Option<String>> {
    let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) else {
        return Ok(None);
    };
    if label.chars().count() > LABEL_MAX {
        return Err(CoreError::ValidationError(format!(
            "label must be at most {LABEL_MAX} characters"
        )));
    }
    Ok(Some(label.to_string()))
}
