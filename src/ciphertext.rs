//! Exponential ElGamal ciphertexts with their attached membership proofs
use crate::{
    arithmetics::{Exponent, GroupElement},
    error::ProofError,
    keys::PublicKey,
    proofs::{
        compose::{self, Operand},
        domain::Domain,
        membership::MembershipProof,
        Proof,
    },
};
use crypto_bigint::rand_core::CryptoRngCore;

const LOG_TARGET: &str = "eeg_membership::ciphertext";

/// The pair (G, H) = (g^r, h^r f^m), the number of sub-ciphertexts it stands for, and the proof
/// that m lies in the expected domain. Multiplying two ciphertexts component-wise encrypts the
/// sum of their plaintexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    big_g: GroupElement,
    big_h: GroupElement,
    size: usize,
    proof: MembershipProof,
}

impl Ciphertext {
    pub fn new(
        big_g: GroupElement,
        big_h: GroupElement,
        size: usize,
        proof: MembershipProof,
    ) -> Self {
        return Self {
            big_g,
            big_h,
            size,
            proof,
        };
    }

    pub fn get_big_g(&self) -> &GroupElement {
        return &self.big_g;
    }

    pub fn get_big_h(&self) -> &GroupElement {
        return &self.big_h;
    }

    pub fn get_size(&self) -> usize {
        return self.size;
    }

    pub fn get_proof(&self) -> &MembershipProof {
        return &self.proof;
    }

    /// Encrypt a value from the domain and prove that it is one. The randomness is returned to
    /// the caller, who needs it to compose this ciphertext with others later on.
    pub fn encrypt(
        pk: &PublicKey,
        value: u64,
        domain: &Domain,
        rng: &mut impl CryptoRngCore,
    ) -> Result<(Self, Exponent), ProofError> {
        let r = Exponent::random(rng, pk.get_q_modulus());
        let big_g = pk.get_g().pow(&r);
        let big_h = pk.get_h().pow(&r) * pk.encode(value);
        let proof = MembershipProof::compute(&big_g, &big_h, &r, pk, value, domain, rng)?;
        return Ok((Self::new(big_g, big_h, 1, proof), r));
    }

    /// Check the attached proof against this ciphertext
    pub fn verify(&self, pk: &PublicKey, domain: &Domain) -> Result<bool, ProofError> {
        return self.proof.verify(self, pk, domain);
    }

    /// The homomorphic sum of two proven ciphertexts, proven over `domain`. Returns the new
    /// ciphertext together with its randomness r1 + r2. Neither input is modified.
    #[allow(clippy::too_many_arguments)]
    pub fn combine(
        &self,
        r1: &Exponent,
        domain1: &Domain,
        other: &Self,
        r2: &Exponent,
        domain2: &Domain,
        domain: &Domain,
        pk: &PublicKey,
        rng: &mut impl CryptoRngCore,
    ) -> Result<(Self, Exponent), ProofError> {
        if self.size != other.size {
            tracing::debug!(
                target: LOG_TARGET,
                left = self.size,
                right = other.size,
                "refusing to combine ciphertexts of different sizes"
            );
            return Err(ProofError::OperandMismatch("ciphertext sizes differ"));
        }
        let lhs = Operand::new(self, r1, domain1);
        let rhs = Operand::new(other, r2, domain2);
        let (big_g, big_h, proof) = compose::compute_operation_proof(&lhs, &rhs, domain, pk, rng)?;
        return Ok((Self::new(big_g, big_h, self.size, proof), *r1 + *r2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_encrypt_then_verify() {
        let mut rng = StdRng::seed_from_u64(200);
        let pk = test_utils::fixture_key();
        let domain = Domain::range(0, 1).unwrap();
        let (ctext, r) = Ciphertext::encrypt(&pk, 1, &domain, &mut rng).unwrap();
        assert_eq!(ctext.get_size(), 1);
        assert_eq!(*ctext.get_big_g(), pk.get_g().pow(&r));
        assert_eq!(ctext.verify(&pk, &domain), Ok(true));
    }

    #[test]
    fn test_size_is_preserved_by_combination() {
        let mut rng = StdRng::seed_from_u64(201);
        let pk = test_utils::fixture_key();
        let domain = Domain::range(0, 1).unwrap();
        let (a, ra) = Ciphertext::encrypt(&pk, 1, &domain, &mut rng).unwrap();
        let (b, rb) = Ciphertext::encrypt(&pk, 0, &domain, &mut rng).unwrap();
        let a = Ciphertext::new(a.big_g, a.big_h, 3, a.proof);
        let b = Ciphertext::new(b.big_g, b.big_h, 3, b.proof);

        let sum = Domain::sum(&domain, &domain).unwrap();
        let (c, rc) = a
            .combine(&ra, &domain, &b, &rb, &domain, &sum, &pk, &mut rng)
            .unwrap();
        assert_eq!(c.get_size(), 3);
        assert_eq!(*c.get_big_g(), pk.get_g().pow(&rc));
        assert_eq!(c.verify(&pk, &sum), Ok(true));
    }

    #[test]
    fn test_combine_rejects_size_mismatch() {
        let mut rng = StdRng::seed_from_u64(202);
        let pk = test_utils::fixture_key();
        let domain = Domain::range(0, 1).unwrap();
        let (a, ra) = Ciphertext::encrypt(&pk, 1, &domain, &mut rng).unwrap();
        let (b, rb) = Ciphertext::encrypt(&pk, 1, &domain, &mut rng).unwrap();
        let b = Ciphertext::new(b.big_g, b.big_h, 2, b.proof);
        let sum = Domain::sum(&domain, &domain).unwrap();
        let res = a.combine(&ra, &domain, &b, &rb, &domain, &sum, &pk, &mut rng);
        assert_eq!(
            res,
            Err(ProofError::OperandMismatch("ciphertext sizes differ"))
        );
    }
}
