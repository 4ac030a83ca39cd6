//! MT19937 generator with reproducible seeding.
//!
//! Seeds are expanded exactly the way the scaffolding tool's reference runtime
//! does it, so a template rendered with `seed='123'` produces the same values
//! here as it does there:
//!
//! - text/bytes `s` become the big-endian integer `s ‖ SHA-512(s)`,
//! - integers use their absolute value,
//!
//! and the integer's little-endian 32-bit words become the key of a
//! [`rand_mt::Mt`] generator.

use rand::RngCore;
use rand_mt::Mt;
use sha2::{Digest, Sha512};

/// A seed accepted by the random filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    Text(String),
    Bytes(Vec<u8>),
    Int(i128),
}

impl Seed {
    /// 32-bit key words, least significant first.
    fn key(&self) -> Vec<u32> {
        let big_endian = match self {
            Seed::Text(text) => expand(text.as_bytes()),
            Seed::Bytes(bytes) => expand(bytes),
            Seed::Int(n) => n.unsigned_abs().to_be_bytes().to_vec(),
        };

        let significant = match big_endian.iter().position(|b| *b != 0) {
            Some(first) => &big_endian[first..],
            None => return vec![0],
        };

        significant
            .rchunks(4)
            .map(|chunk| {
                let mut word = [0u8; 4];
                word[4 - chunk.len()..].copy_from_slice(chunk);
                u32::from_be_bytes(word)
            })
            .collect()
    }
}

fn expand(bytes: &[u8]) -> Vec<u8> {
    let mut out = bytes.to_vec();
    out.extend_from_slice(&Sha512::digest(bytes));
    out
}

/// MT19937 (32-bit) keyed from a [`Seed`].
#[derive(Clone)]
pub struct MersenneTwister(Mt);

impl std::fmt::Debug for MersenneTwister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MersenneTwister").finish_non_exhaustive()
    }
}

impl MersenneTwister {
    pub fn from_seed(seed: &Seed) -> Self {
        MersenneTwister(Mt::new_with_key(seed.key()))
    }
}

impl RngCore for MersenneTwister {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}
