// Form submission validation
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormFactor {
    #[default]
    Desktop,
    Phone,
    Tablet,
}

impl FormFactor {
    pub const ALL: [FormFactor; 3] = [FormFactor::Desktop, FormFactor::Phone, FormFactor::Tablet];

    pub fn as_str(self) -> &'static str {
        match self {
            FormFactor::Desktop => "DESKTOP",
            FormFactor::Phone => "PHONE",
            FormFactor::Tablet => "TABLET",
        }
    }

    /// Exact match on the API name; anything else falls back to DESKTOP.
    pub fn parse_or_default(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|ff| ff.as_str() == raw)
            .unwrap_or_default()
    }
}

impl fmt::Display for FormFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submission that passed validation and can be dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub urls: Vec<String>,
    pub form_factor: FormFactor,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid form data")]
    NoValidUrls,
}

/// Split, sanitize and filter the comma separated URL list.
///
/// Only `[a-zA-Z0-9/:.]` survives sanitizing, so query strings are mangled
/// (`?`, `=`, `&` and friends are dropped). Duplicates are kept.
pub fn sanitize_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| {
            item.trim()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.'))
                .collect::<String>()
        })
        .filter(|url| url.starts_with("http"))
        .collect()
}

pub fn validate(raw_urls: &str, raw_form_factor: &str) -> Result<Submission, ValidationError> {
    let urls = sanitize_urls(raw_urls);
    if urls.is_empty() {
        return Err(ValidationError::NoValidUrls);
    }

    Ok(Submission {
        urls,
        form_factor: FormFactor::parse_or_default(raw_form_factor),
    })
}
