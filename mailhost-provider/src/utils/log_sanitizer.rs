//! Log sanitization utilities
//!
//! Response bodies from the mailbox and deliverability services carry DKIM public keys and
//! ownership tokens; credentials come from configuration. Neither is logged in full.

/// Maximum number of bytes of a response body included in log output.
const TRUNCATE_LIMIT: usize = 256;

/// Number of trailing characters of a secret left visible by [`mask_secret`].
const VISIBLE_SECRET_CHARS: usize = 4;

/// Largest char boundary not after `index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

/// Truncate a response body for logging.
///
/// Bodies within the limit are returned unchanged, longer ones are cut at a char
/// boundary and suffixed with their total length.
pub fn truncate_for_log(s: &str) -> String {
    if s.len() <= TRUNCATE_LIMIT {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, TRUNCATE_LIMIT)],
            s.len()
        )
    }
}

/// Mask a credential for logging, keeping only its last few characters.
///
/// Short secrets are masked entirely.
pub fn mask_secret(secret: &str) -> String {
    let chars = secret.chars().count();
    if chars <= VISIBLE_SECRET_CHARS * 2 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(chars - VISIBLE_SECRET_CHARS).collect();
    format!("****{tail}")
}
