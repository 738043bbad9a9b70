//! Composition of two membership proofs into a proof for the homomorphic sum.
//!
//! Given proven ciphertexts (G1, H1) over domain1 and (G2, H2) over domain2, the product
//! (G1 G2, H1 H2) encrypts m1 + m2 under randomness r1 + r2. The prover, who knows r1 and r2,
//! builds a membership proof for the product over a merged domain in two steps:
//!
//! 1. Revision: each sub-proof's (s, c) lists are stretched to the merged domain. Positions the
//!    sub-proof already covers keep their pair; every other position gets a fresh random pair,
//!    which is a valid simulated branch for any choice of (s, c).
//! 2. Combination: at every merged position the pairs add up, s = s1 + s2 and c = c1 + c2, and
//!    the commitments multiply. y1 y2 = g^{s - r1 c1 - r2 c2} misses g^{-(r2 c1 + r1 c2)} for
//!    y = g^{s - r c}; z1 z2 likewise misses H2^{c1} H1^{c2}. Dividing those cross terms out
//!    gives exactly the commitments a fresh proof of the product would carry.
//!
//! The position whose value equals m1 + m2 is then re-committed with a fresh t and closed by the
//! challenge, as in a fresh proof.
use crate::{
    arithmetics::{Exponent, GroupElement},
    challenge::Transcript,
    ciphertext::Ciphertext,
    error::ProofError,
    keys::PublicKey,
    proofs::{
        domain::Domain,
        membership::{Branch, MembershipProof},
    },
};
use crypto_bigint::{
    rand_core::CryptoRngCore,
    subtle::{Choice, ConditionallySelectable, ConstantTimeEq},
};

const LOG_TARGET: &str = "eeg_membership::proofs::compose";

/// A proven summand: the ciphertext, the randomness that formed it, and the domain its proof
/// was made over. The proof's lists must run in lock-step with that domain.
#[derive(Debug, Clone, Copy)]
pub struct Operand<'a> {
    ciphertext: &'a Ciphertext,
    randomness: &'a Exponent,
    domain: &'a Domain,
}

impl<'a> Operand<'a> {
    pub fn new(ciphertext: &'a Ciphertext, randomness: &'a Exponent, domain: &'a Domain) -> Self {
        return Self {
            ciphertext,
            randomness,
            domain,
        };
    }
}

/// Stretch the sub-proof's (s, c) pairs over the merged domain. The proof itself is left
/// untouched; the revised pairs are freshly owned.
fn revise(
    operand: &Operand,
    domain: &Domain,
    pk: &PublicKey,
    rng: &mut impl CryptoRngCore,
) -> Result<Vec<(Exponent, Exponent)>, ProofError> {
    let proof = operand.ciphertext.get_proof();
    if proof.len() != operand.domain.len() {
        return Err(ProofError::OperandMismatch("proof length differs from its domain"));
    }

    let q = pk.get_q_modulus();
    let (min, max) = (operand.domain.min(), operand.domain.max());
    let revised = domain
        .values()
        .iter()
        .map(|d| {
            let covered = if *d < min || *d > max {
                None
            } else {
                operand.domain.position(*d)
            };
            match covered {
                Some(j) => (
                    pk.exponent(&proof.get_s_list()[j]),
                    pk.exponent(&proof.get_c_list()[j]),
                ),
                None => (Exponent::random(rng, q), Exponent::random(rng, q)),
            }
        })
        .collect();
    return Ok(revised);
}

/// Prove that the product of the two operands' ciphertexts encrypts a member of `domain`,
/// usually `Domain::sum` of the two operand domains. Returns the product pair and its proof.
///
/// Fails with `KeyMismatch` if an operand lives in another group, and with `OperandMismatch` if
/// an operand's proof does not match its domain or if m1 + m2 is not in `domain`.
pub fn compute_operation_proof(
    lhs: &Operand,
    rhs: &Operand,
    domain: &Domain,
    pk: &PublicKey,
    rng: &mut impl CryptoRngCore,
) -> Result<(GroupElement, GroupElement, MembershipProof), ProofError> {
    for operand in [lhs, rhs] {
        let ctext = operand.ciphertext;
        if !ctext.get_proof().matches_key(pk)
            || !pk.owns(ctext.get_big_g())
            || !pk.owns(ctext.get_big_h())
        {
            return Err(ProofError::KeyMismatch);
        }
    }

    let revised1 = revise(lhs, domain, pk, rng)?;
    let revised2 = revise(rhs, domain, pk, rng)?;
    tracing::debug!(
        target: LOG_TARGET,
        left = lhs.domain.len(),
        right = rhs.domain.len(),
        merged = domain.len(),
        "revised operand proofs"
    );

    let (g1, h1) = (*lhs.ciphertext.get_big_g(), *lhs.ciphertext.get_big_h());
    let (g2, h2) = (*rhs.ciphertext.get_big_g(), *rhs.ciphertext.get_big_h());
    let (r1, r2) = (*lhs.randomness, *rhs.randomness);
    let big_g = g1 * g2;
    let big_h = h1 * h2;
    let r = r1 + r2;

    let q = pk.get_q_modulus();
    let (g, h) = (*pk.get_g(), *pk.get_h());
    let t = Exponent::random(rng, q);
    let commit_y = g.pow(&t);
    let commit_z = h.pow(&t);
    let h_to_r = h.pow(&r);
    let zero = Exponent::zero(q);

    let mut transcript = Transcript::new(&g, &h, &big_g, &big_h);
    let mut branches = Vec::with_capacity(domain.len());
    let mut found = Choice::from(0);

    let pairs = revised1.into_iter().zip(revised2);
    for (d, ((s1, c1), (s2, c2))) in domain.values().iter().zip(pairs) {
        // c2 must come from the right operand's own list. Taking it from the left list leaves
        // an uncancelled cross term, and the merged proof would not verify.
        let s = s1 + s2;
        let c = c1 + c2;
        let fpow = pk.encode(*d);

        let y1 = g.pow(&s1) * g1.pow(&-c1);
        let y2 = g.pow(&s2) * g2.pow(&-c2);
        let y = (y1 * y2) / g.pow(&(r2 * c1 + r1 * c2));

        let z1 = h.pow(&s1) * (h1 / fpow).pow(&-c1);
        let z2 = h.pow(&s2) * (h2 / fpow).pow(&-c2);
        let z = (z1 * z2) / (h2.pow(&c1) * h1.pow(&c2));

        // H / f^d = h^r exactly when d = m1 + m2
        let is_real = (big_h / fpow).ct_eq(&h_to_r);
        found |= is_real;

        let branch = Branch {
            y: GroupElement::conditional_select(&y, &commit_y, is_real),
            z: GroupElement::conditional_select(&z, &commit_z, is_real),
            s: Exponent::conditional_select(&s, &zero, is_real),
            c: Exponent::conditional_select(&c, &zero, is_real),
            is_real,
        };
        transcript.append_pair(&branch.y, &branch.z);
        branches.push(branch);
    }

    if !bool::from(found) {
        tracing::debug!(target: LOG_TARGET, "combined plaintext is outside the merged domain");
        return Err(ProofError::OperandMismatch("combined plaintext is outside the merged domain"));
    }

    let proof = MembershipProof::finish(pk, branches, &transcript, &t, &r);
    return Ok((big_g, big_h, proof));
}
