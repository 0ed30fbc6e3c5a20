//! Salted password hashing for link access control.
//!
//! Hashes are self-describing strings of the form
//! `pbkdf2$<iterations>$<base64 salt>$<base64 derived bits>`, derived with
//! PBKDF2-HMAC-SHA256. Verification fails closed: malformed input of any
//! kind yields `false`, indistinguishable from a wrong password.

use base64::prelude::*;
use rand::RngCore;
use ring::pbkdf2;
use std::num::NonZeroU32;
use subtle::ConstantTimeEq;

const ALGORITHM_TAG: &str = "pbkdf2";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const PBKDF2_ROUNDS: NonZeroU32 = NonZeroU32::new(100_000).unwrap();

/// Derives a salted hash for a link password.
///
/// Consumes 16 bytes of OS randomness per call; otherwise side-effect free.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);

    let derived = derive_bits(PBKDF2_ROUNDS, &salt, password);

    format!(
        "{}${}${}${}",
        ALGORITHM_TAG,
        PBKDF2_ROUNDS.get(),
        BASE64_STANDARD.encode(salt),
        BASE64_STANDARD.encode(derived),
    )
}

/// Checks a candidate password against a stored hash string.
///
/// Returns `false` for a wrong password and for any malformed hash (wrong
/// field count, unknown algorithm tag, non-numeric or zero iteration count,
/// undecodable base64). Never returns an error the caller could tell apart
/// from a plain mismatch.
///
/// The byte comparison is constant-time over equal-length values. A length
/// mismatch returns early; that reveals only the stored digest length, an
/// accepted minor timing channel.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let fields: Vec<&str> = stored.split('$').collect();
    if fields.len() != 4 || fields[0] != ALGORITHM_TAG {
        return false;
    }

    let Ok(rounds) = fields[1].parse::<u32>() else {
        return false;
    };
    let Some(rounds) = NonZeroU32::new(rounds) else {
        return false;
    };
    let Ok(salt) = BASE64_STANDARD.decode(fields[2]) else {
        return false;
    };
    let Ok(expected) = BASE64_STANDARD.decode(fields[3]) else {
        return false;
    };

    if expected.len() != KEY_LEN {
        return false;
    }

    let derived = derive_bits(rounds, &salt, candidate);
    derived.ct_eq(expected.as_slice()).into()
}

fn derive_bits(rounds: NonZeroU32, salt: &[u8], password: &str) -> [u8; KEY_LEN] {
    let mut out = [0u8; KEY_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        rounds,
        salt,
        password.as_bytes(),
        &mut out,
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_round_trip() {
        let hash = hash_password("hunter2");
        assert!(verify_password(&hash, "hunter2"));
    }

    #[test]
    fn test_wrong_password_rejected() {
        let hash = hash_password("correct horse");
        assert!(!verify_password(&hash, "battery staple"));
    }

    #[test]
    fn test_hash_format() {
        let hash = hash_password("pw");
        let fields: Vec<&str> = hash.split('$').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], "pbkdf2");
        assert_eq!(fields[1], "100000");
        assert_eq!(BASE64_STANDARD.decode(fields[2]).unwrap().len(), 16);
        assert_eq!(BASE64_STANDARD.decode(fields[3]).unwrap().len(), 32);
    }

    #[test]
    fn test_salts_differ_between_calls() {
        let a = hash_password("same");
        let b = hash_password("same");
        assert_ne!(a, b);
        assert!(verify_password(&a, "same"));
        assert!(verify_password(&b, "same"));
    }

    #[test]
    fn test_malformed_hashes_fail_closed() {
        assert!(!verify_password("", "pw"));
        assert!(!verify_password("pbkdf2", "pw"));
        assert!(!verify_password("pbkdf2$100000$onlythree", "pw"));
        assert!(!verify_password("pbkdf2$a$b$c$d", "pw"));
        assert!(!verify_password("bcrypt$100000$c2FsdA==$Ym l0cw==", "pw"));
        assert!(!verify_password("pbkdf2$not-a-number$c2FsdA==$Yml0cw==", "pw"));
        assert!(!verify_password("pbkdf2$0$c2FsdA==$Yml0cw==", "pw"));
        assert!(!verify_password("pbkdf2$100000$!!!$Yml0cw==", "pw"));
        assert!(!verify_password("pbkdf2$100000$c2FsdA==$!!!", "pw"));
    }

    #[test]
    fn test_truncated_digest_rejected() {
        let hash = hash_password("pw");
        let fields: Vec<&str> = hash.split('$').collect();
        let short = BASE64_STANDARD.encode(b"short");
        let tampered = format!("{}${}${}${}", fields[0], fields[1], fields[2], short);
        assert!(!verify_password(&tampered, "pw"));
    }

    #[test]
    fn test_custom_iteration_count_respected() {
        // A stored hash with a different round count must still verify.
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);
        let rounds = NonZeroU32::new(1_000).unwrap();
        let derived = derive_bits(rounds, &salt, "pw");
        let stored = format!(
            "pbkdf2$1000${}${}",
            BASE64_STANDARD.encode(salt),
            BASE64_STANDARD.encode(derived),
        );
        assert!(verify_password(&stored, "pw"));
        assert!(!verify_password(&stored, "other"));
    }
}
