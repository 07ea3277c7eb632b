use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const USER_ID_SUFFIX_LEN: usize = 6;

/// One agent conversation: a client-minted user id paired with the
/// server-issued session id.
///
/// Always an explicit value threaded through the chat panel; the session dies
/// with the process and a "new session" action simply replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSession {
    pub user_id: String,
    pub session_id: String,
}

impl AgentSession {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

/// Mints an opaque client-side user identifier: `user_<timestamp36>_<random>`.
pub fn mint_user_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();

    let mut rng = rand::thread_rng();
    let suffix: String = (0..USER_ID_SUFFIX_LEN)
        .map(|_| BASE36_ALPHABET[rng.gen_range(0..BASE36_ALPHABET.len())] as char)
        .collect();

    format!("user_{}_{}", to_base36(millis), suffix)
}

fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();

    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_234_567), "qglj");
    }

    #[test]
    fn minted_user_ids_have_the_expected_shape() {
        let user_id = mint_user_id();
        let mut parts = user_id.splitn(3, '_');
        assert_eq!(parts.next(), Some("user"));

        let timestamp = parts.next().expect("timestamp segment");
        let suffix = parts.next().expect("random segment");
        assert!(!timestamp.is_empty());
        assert_eq!(suffix.len(), USER_ID_SUFFIX_LEN);
        assert!(
            timestamp
                .chars()
                .chain(suffix.chars())
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }
}
