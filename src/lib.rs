//! Zero-knowledge proofs of set membership over exponential ElGamal ciphertexts, and the
//! homomorphic composition of two such proofs into a proof for the sum of their plaintexts.
use crypto_bigint::Uint;

/// Use the same big integer type everywhere
pub const LIMBS: usize = 2048 / 64; // 32 words each 64 bits, a total of 2048 bits
pub type BigInt = Uint<LIMBS>;

pub mod arithmetics;
pub mod challenge;
pub mod ciphertext;
pub mod codec;
pub mod error;
pub mod keys;
pub mod proofs;

#[cfg(test)]
pub(crate) mod test_utils;

pub use ciphertext::Ciphertext;
pub use error::ProofError;
pub use keys::PublicKey;
pub use proofs::{domain::Domain, membership::MembershipProof, Proof};
