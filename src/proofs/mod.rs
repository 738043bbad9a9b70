//! Zero-knowledge proofs attached to ciphertexts.
//!
//! A ciphertext carries a proof that its plaintext lies in a public domain. The only proof
//! today is the OR-composition membership proof for exponential ElGamal, but verification goes
//! through the [`Proof`] capability so that other cryptosystems can plug in.

pub mod compose; // merge two proofs into a proof for the homomorphic sum
pub mod domain;
pub mod membership; // prove and verify set membership

use crate::error::ProofError;
use domain::Domain;

/// Anything that can be checked against a ciphertext, a public key, and a domain.
///
/// `Ok(false)` covers every cryptographic rejection: a forged or tampered proof, a tampered
/// ciphertext, a domain that does not cover the proof. `Err` is reserved for structural
/// problems, such as a proof made under different group parameters than the key.
pub trait Proof {
    type Ciphertext;
    type PublicKey;

    fn verify(
        &self,
        ciphertext: &Self::Ciphertext,
        key: &Self::PublicKey,
        domain: &Domain,
    ) -> Result<bool, ProofError>;
}
