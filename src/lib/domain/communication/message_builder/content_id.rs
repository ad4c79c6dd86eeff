//! Content ids for inline parts

use uuid::Uuid;

const DEFAULT_CONTENT_ID_DOMAIN: &str = "localhost";

/// Generates content ids for inline parts
///
/// Any `Fn() -> String` closure is a generator, which makes it easy to inject a
/// fixed id in tests.
pub trait ContentIdGenerator: Send + Sync + 'static {
    /// Returns a new content id, with or without enclosing angle brackets
    fn generate(&self) -> String;
}

impl<F> ContentIdGenerator for F
where
    F: Fn() -> String + Send + Sync + 'static,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Generates `<uuid@domain>` content ids
#[derive(Clone, Debug)]
pub struct UuidContentIds {
    domain: String,
}

impl UuidContentIds {
    /// Creates a generator using `domain` as the right-hand side of the ids
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }
}

impl Default for UuidContentIds {
    fn default() -> Self {
        Self::new(DEFAULT_CONTENT_ID_DOMAIN)
    }
}

impl ContentIdGenerator for UuidContentIds {
    fn generate(&self) -> String {
        format!("<{}@{}>", Uuid::now_v7().simple(), self.domain)
    }
}

/// Strips the enclosing angle brackets from a content id
pub fn bare_content_id(content_id: &str) -> &str {
    let trimmed = content_id.trim();

    trimmed
        .strip_prefix('<')
        .and_then(|id| id.strip_suffix('>'))
        .unwrap_or(trimmed)
}

/// Replaces every occurrence of each template name in `body` with
/// `cid:<content id>`
///
/// Names are replaced in order. A name that does not occur in the body is
/// ignored.
pub fn substitute_content_ids<N, I>(body: &str, substitutions: &[(N, I)]) -> String
where
    N: AsRef<str>,
    I: AsRef<str>,
{
    substitutions
        .iter()
        .filter(|(name, _)| !name.as_ref().is_empty())
        .fold(body.to_string(), |body, (name, content_id)| {
            body.replace(
                name.as_ref(),
                &format!("cid:{}", bare_content_id(content_id.as_ref())),
            )
        })
}
