//! Fiat-Shamir challenge derivation.
//!
//! The commitment string is the concatenation g || h || G || H || y_0 || z_0 || ... of the
//! decimal expansions of its elements, with no separators. Its digest, read as a big-endian
//! integer and reduced mod q, is the challenge. Existing proofs on the wire were produced with
//! SHA-1 over exactly this string; switching to a different digest changes every challenge and
//! invalidates them, so the legacy digest is pinned here.
use crate::arithmetics::{Exponent, GroupElement, Modulus};
use digest::Digest;

const LOG_TARGET: &str = "eeg_membership::challenge";

pub type LegacyDigest = sha1::Sha1;

/// Accumulates the canonical commitment string shared by prover and verifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    buffer: String,
}

impl Transcript {
    /// Start the commitment string with the key generators and the ciphertext
    pub fn new(
        g: &GroupElement,
        h: &GroupElement,
        big_g: &GroupElement,
        big_h: &GroupElement,
    ) -> Self {
        let mut transcript = Self {
            buffer: String::with_capacity(4096),
        };
        for elem in [g, h, big_g, big_h] {
            transcript.append(elem);
        }
        return transcript;
    }

    pub fn append(&mut self, elem: &GroupElement) {
        self.buffer.push_str(&elem.to_string());
    }

    /// Append one branch commitment (y_i, z_i)
    pub fn append_pair(&mut self, y: &GroupElement, z: &GroupElement) {
        self.append(y);
        self.append(z);
    }

    pub fn as_str(&self) -> &str {
        return &self.buffer;
    }

    /// Hash the commitment string with an arbitrary digest and reduce it mod q
    pub fn challenge_with<D: Digest>(&self, q: &Modulus) -> Exponent {
        let hash = D::digest(self.buffer.as_bytes());
        let challenge = Exponent::from_be_bytes(&hash, q);
        tracing::trace!(target: LOG_TARGET, %challenge, "derived challenge");
        return challenge;
    }

    /// The challenge under the pinned legacy digest
    pub fn challenge(&self, q: &Modulus) -> Exponent {
        return self.challenge_with::<LegacyDigest>(q);
    }
}
