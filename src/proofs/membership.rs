//! Non-interactive proof that an exponential ElGamal ciphertext encrypts a value from a domain.
//!
//! The ciphertext is (G, H) = (g^r, h^r f^m) with m = d_x for some position x of the domain
//! (d_0, ..., d_{n-1}). The proof is an OR-composition of n Chaum-Pedersen style branches:
//!
//! - every branch i != x is simulated: pick s_i, c_i at random and set
//!   y_i = g^{s_i} G^{-c_i}, z_i = h^{s_i} (H / f^{d_i})^{-c_i}
//! - the real branch commits to a fresh t: y_x = g^t, z_x = h^t
//! - the challenge c = Hash(g, h, G, H, y_0, z_0, ..., y_{n-1}, z_{n-1}) mod q
//! - the real branch answers c_x = c - sum(c_i, i != x) and s_x = c_x r + t
//!
//! The verifier recomputes every (y_i, z_i) from (s_i, c_i) with the same formula as the
//! simulated branches, which also holds for the real branch, and checks that the c_i sum to the
//! hash of the recomputed commitment string. Nothing in the transcript identifies x.
use crate::{
    arithmetics::{Exponent, GroupElement},
    challenge::Transcript,
    ciphertext::Ciphertext,
    error::ProofError,
    keys::PublicKey,
    proofs::{domain::Domain, Proof},
    BigInt,
};
use crypto_bigint::{
    rand_core::CryptoRngCore,
    subtle::{Choice, ConditionallySelectable, ConstantTimeEq},
};

const LOG_TARGET: &str = "eeg_membership::proofs::membership";

/// Proof of set membership. The four lists run in lock-step with the domain the proof was made
/// over; (p, q) pins the group it was made in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipProof {
    p: BigInt,
    q: BigInt,
    y_list: Vec<BigInt>,
    z_list: Vec<BigInt>,
    s_list: Vec<BigInt>,
    c_list: Vec<BigInt>,
}

/// One position of a proof under construction
pub(crate) struct Branch {
    pub y: GroupElement,
    pub z: GroupElement,
    pub s: Exponent,
    pub c: Exponent,
    /// Set at the single position that carries the real commitment
    pub is_real: Choice,
}

impl MembershipProof {
    /// Assemble a proof from its parts with no check
    pub(crate) fn new(
        p: BigInt,
        q: BigInt,
        y_list: Vec<BigInt>,
        z_list: Vec<BigInt>,
        s_list: Vec<BigInt>,
        c_list: Vec<BigInt>,
    ) -> Self {
        return Self {
            p,
            q,
            y_list,
            z_list,
            s_list,
            c_list,
        };
    }

    pub fn get_p(&self) -> &BigInt {
        return &self.p;
    }

    pub fn get_q(&self) -> &BigInt {
        return &self.q;
    }

    pub fn get_y_list(&self) -> &[BigInt] {
        return &self.y_list;
    }

    pub fn get_z_list(&self) -> &[BigInt] {
        return &self.z_list;
    }

    pub fn get_s_list(&self) -> &[BigInt] {
        return &self.s_list;
    }

    pub fn get_c_list(&self) -> &[BigInt] {
        return &self.c_list;
    }

    /// Number of branches, i.e. the size of the domain the proof was made over
    pub fn len(&self) -> usize {
        return self.c_list.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.c_list.is_empty();
    }

    /// True iff the proof was made in the group of this key
    pub fn matches_key(&self, pk: &PublicKey) -> bool {
        return self.p == *pk.get_p() && self.q == *pk.get_q();
    }

    /// Prove that (big_g, big_h) = (g^r, h^r f^value) encrypts a member of the domain.
    ///
    /// Every position draws its (s, c) pair and pays for the simulated commitment, and the real
    /// position is picked with constant-time selection, so neither the running time nor the RNG
    /// consumption depends on where the value sits in the domain.
    pub fn compute(
        big_g: &GroupElement,
        big_h: &GroupElement,
        r: &Exponent,
        pk: &PublicKey,
        value: u64,
        domain: &Domain,
        rng: &mut impl CryptoRngCore,
    ) -> Result<Self, ProofError> {
        if !pk.owns(big_g) || !pk.owns(big_h) {
            return Err(ProofError::KeyMismatch);
        }
        let found = domain
            .values()
            .iter()
            .fold(Choice::from(0), |acc, d| acc | d.ct_eq(&value));
        if !bool::from(found) {
            return Err(ProofError::InvalidRealValue { value });
        }

        let q = pk.get_q_modulus();
        let t = Exponent::random(rng, q);
        let commit_y = pk.get_g().pow(&t);
        let commit_z = pk.get_h().pow(&t);
        let zero = Exponent::zero(q);

        let mut transcript = Transcript::new(pk.get_g(), pk.get_h(), big_g, big_h);
        let mut branches = Vec::with_capacity(domain.len());
        for d in domain.values() {
            let is_real = d.ct_eq(&value);
            let s = Exponent::random(rng, q);
            let c = Exponent::random(rng, q);
            let (y, z) = simulate(pk, big_g, big_h, *d, &s, &c);

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

        tracing::debug!(target: LOG_TARGET, branches = branches.len(), "computed membership proof");
        return Ok(Self::finish(pk, branches, &transcript, &t, r));
    }

    /// Close the proof once all commitments are in the transcript. The real position still
    /// holds c = s = 0; it receives c_real = c - sum(c_i) and s_real = c_real r + t.
    pub(crate) fn finish(
        pk: &PublicKey,
        branches: Vec<Branch>,
        transcript: &Transcript,
        t: &Exponent,
        r: &Exponent,
    ) -> Self {
        let challenge = transcript.challenge(pk.get_q_modulus());
        let real_c = branches
            .iter()
            .fold(challenge, |acc, branch| acc - branch.c);
        let real_s = real_c * *r + *t;

        let mut y_list = Vec::with_capacity(branches.len());
        let mut z_list = Vec::with_capacity(branches.len());
        let mut s_list = Vec::with_capacity(branches.len());
        let mut c_list = Vec::with_capacity(branches.len());
        for branch in branches {
            let s = Exponent::conditional_select(&branch.s, &real_s, branch.is_real);
            let c = Exponent::conditional_select(&branch.c, &real_c, branch.is_real);
            y_list.push(branch.y.retrieve());
            z_list.push(branch.z.retrieve());
            s_list.push(s.retrieve());
            c_list.push(c.retrieve());
        }

        return Self::new(*pk.get_p(), *pk.get_q(), y_list, z_list, s_list, c_list);
    }

    /// Verify the proof against a raw ciphertext pair.
    ///
    /// Returns `Err(KeyMismatch)` if the proof or the ciphertext lives in another group than the
    /// key; every other failure, including a domain shorter than the proof, is `Ok(false)`.
    pub fn verify_pair(
        &self,
        big_g: &GroupElement,
        big_h: &GroupElement,
        pk: &PublicKey,
        domain: &Domain,
    ) -> Result<bool, ProofError> {
        if !self.matches_key(pk) || !pk.owns(big_g) || !pk.owns(big_h) {
            return Err(ProofError::KeyMismatch);
        }

        let n = self.c_list.len();
        if self.y_list.len() != n || self.z_list.len() != n || self.s_list.len() != n {
            tracing::debug!(target: LOG_TARGET, "proof lists differ in length");
            return Ok(false);
        }
        if domain.len() < n {
            tracing::debug!(
                target: LOG_TARGET,
                domain = domain.len(),
                proof = n,
                "domain is shorter than the proof"
            );
            return Ok(false);
        }

        let q = pk.get_q_modulus();
        let mut transcript = Transcript::new(pk.get_g(), pk.get_h(), big_g, big_h);
        let mut sum = Exponent::zero(q);
        let mut consistent = Choice::from(1);

        for (i, d) in domain.values().iter().take(n).enumerate() {
            if self.s_list[i] >= *pk.get_q() || self.c_list[i] >= *pk.get_q() {
                tracing::debug!(target: LOG_TARGET, index = i, "response out of range");
                return Ok(false);
            }
            let (claimed_y, claimed_z) =
                match (pk.element(&self.y_list[i]), pk.element(&self.z_list[i])) {
                    (Some(y), Some(z)) => (y, z),
                    _ => {
                        tracing::debug!(target: LOG_TARGET, index = i, "commitment out of range");
                        return Ok(false);
                    }
                };
            let s = pk.exponent(&self.s_list[i]);
            let c = pk.exponent(&self.c_list[i]);

            let (y, z) = simulate(pk, big_g, big_h, *d, &s, &c);
            consistent &= y.ct_eq(&claimed_y) & z.ct_eq(&claimed_z);
            sum = sum + c;
            transcript.append_pair(&y, &z);
        }

        if !bool::from(consistent) {
            tracing::debug!(target: LOG_TARGET, "commitments do not match the responses");
            return Ok(false);
        }
        let challenge = transcript.challenge(q);
        if sum != challenge {
            tracing::debug!(target: LOG_TARGET, "challenges do not sum to the hash");
            return Ok(false);
        }
        return Ok(true);
    }
}

impl Proof for MembershipProof {
    type Ciphertext = Ciphertext;
    type PublicKey = PublicKey;

    fn verify(
        &self,
        ciphertext: &Ciphertext,
        key: &PublicKey,
        domain: &Domain,
    ) -> Result<bool, ProofError> {
        return self.verify_pair(ciphertext.get_big_g(), ciphertext.get_big_h(), key, domain);
    }
}

/// The commitment pair that (s, c) answers for domain value d:
/// y = g^s G^{-c}, z = h^s (H / f^d)^{-c}
pub(crate) fn simulate(
    pk: &PublicKey,
    big_g: &GroupElement,
    big_h: &GroupElement,
    d: u64,
    s: &Exponent,
    c: &Exponent,
) -> (GroupElement, GroupElement) {
    let neg_c = -*c;
    let y = pk.get_g().pow(s) * big_g.pow(&neg_c);
    let z = pk.get_h().pow(s) * (*big_h / pk.encode(d)).pow(&neg_c);
    return (y, z);
}
