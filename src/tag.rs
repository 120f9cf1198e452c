use crate::models::Session;

/// Returns the candidate device tag when it should be appended to the
/// session: non-empty after trimming and not already present. `None` means
/// "do not append".
pub fn validated_tag<'a>(candidate: &'a str, session: &Session) -> Option<&'a str> {
    let candidate = candidate.trim();
    if candidate.is_empty() || session.tag.iter().any(|tag| tag == candidate) {
        None
    } else {
        Some(candidate)
    }
}
