//! Password hashing for stored credentials.
//!
//! PBKDF2-HMAC-SHA256 with a random 16-byte salt. Hashes are self-describing
//! so the iteration count can be raised without invalidating old hashes:
//!
//! ```text
//! $pbkdf2-sha256$<iterations>$<base64 salt>$<base64 hash>
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

const PREFIX: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

pub const DEFAULT_ITERATIONS: u32 = 100_000;

#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    iterations: u32,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self { iterations: iterations.max(1) }
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let mut out = [0u8; HASH_LEN];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, self.iterations, &mut out);
        format!(
            "${PREFIX}${}${}${}",
            self.iterations,
            STANDARD_NO_PAD.encode(salt),
            STANDARD_NO_PAD.encode(out),
        )
    }

    /// Verifies `password` against a hash produced by [`hash`](Self::hash),
    /// using the iteration count stored in the hash. Unparseable hashes never
    /// verify.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Some((iterations, salt, expected)) = parse(stored) else {
            return false;
        };
        let mut out = vec![0u8; expected.len()];
        pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut out);
        constant_time_eq(&out, &expected)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self { Self::new(DEFAULT_ITERATIONS) }
}

fn parse(stored: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    // "" before the leading `$`, then prefix, iterations, salt, hash.
    let mut parts = stored.split('$');
    if !parts.next()?.is_empty() || parts.next()? != PREFIX {
        return None;
    }
    let iterations = parts.next()?.parse::<u32>().ok().filter(|n| *n > 0)?;
    let salt = STANDARD_NO_PAD.decode(parts.next()?).ok()?;
    let hash = STANDARD_NO_PAD.decode(parts.next()?).ok()?;
    if parts.next().is_some() || hash.is_empty() {
        return None;
    }
    Some((iterations, salt, hash))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
