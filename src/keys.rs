//! The public key of the exponential ElGamal cryptosystem
use crate::{
    arithmetics::{Exponent, GroupElement, Modulus},
    error::ProofError,
    BigInt,
};

/// The public key (p, q, g, h, f). p = 2q + 1 is a safe prime, and g, h, f generate the
/// subgroup of order q. f is the base that plaintexts are encoded into: m -> f^m.
///
/// This crate never handles the private exponent behind h; keys come from an external key
/// ceremony.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    p: Modulus,
    q: Modulus,
    g: GroupElement,
    h: GroupElement,
    f: GroupElement,
}

impl PublicKey {
    /// Validate the group parameters and assemble a public key
    pub fn new(p: BigInt, g: BigInt, h: BigInt, f: BigInt) -> Result<Self, ProofError> {
        if !crypto_primes::is_safe_prime(&p) {
            return Err(ProofError::InvalidPublicKey("p is not a safe prime"));
        }
        let q_val = p.wrapping_sub(&BigInt::ONE) >> 1;
        let p = Modulus::new(&p).ok_or(ProofError::InvalidPublicKey("p is not odd"))?;
        let q = Modulus::new(&q_val).ok_or(ProofError::InvalidPublicKey("q is not odd"))?;

        let g = Self::subgroup_generator(&g, &p, &q)?;
        let h = Self::subgroup_generator(&h, &p, &q)?;
        let f = Self::subgroup_generator(&f, &p, &q)?;

        return Ok(Self { p, q, g, h, f });
    }

    /// A generator of the order-q subgroup is any element other than 1 whose q-th power is 1
    fn subgroup_generator(
        val: &BigInt,
        p: &Modulus,
        q: &Modulus,
    ) -> Result<GroupElement, ProofError> {
        let elem = GroupElement::new(val, p)
            .ok_or(ProofError::InvalidPublicKey("generator is not in [1, p)"))?;
        if *val == BigInt::ONE {
            return Err(ProofError::InvalidPublicKey("generator is the identity"));
        }
        // q reduces to zero as an exponent, so take elem^(q-1) * elem
        let order_check = elem.pow(&Exponent::new(&q.get_value().wrapping_sub(&BigInt::ONE), q))
            * elem;
        if order_check.retrieve() != BigInt::ONE {
            return Err(ProofError::InvalidPublicKey("generator is outside the order-q subgroup"));
        }
        return Ok(elem);
    }

    pub fn get_p(&self) -> &BigInt {
        return self.p.get_value();
    }

    pub fn get_q(&self) -> &BigInt {
        return self.q.get_value();
    }

    pub fn get_p_modulus(&self) -> &Modulus {
        return &self.p;
    }

    pub fn get_q_modulus(&self) -> &Modulus {
        return &self.q;
    }

    pub fn get_g(&self) -> &GroupElement {
        return &self.g;
    }

    pub fn get_h(&self) -> &GroupElement {
        return &self.h;
    }

    pub fn get_f(&self) -> &GroupElement {
        return &self.f;
    }

    /// Lift an integer into the group; None if it is zero or not below p
    pub fn element(&self, val: &BigInt) -> Option<GroupElement> {
        return GroupElement::new(val, &self.p);
    }

    /// Reduce an integer modulo q
    pub fn exponent(&self, val: &BigInt) -> Exponent {
        return Exponent::new(val, &self.q);
    }

    /// Encode a plaintext into the group: m -> f^m
    pub fn encode(&self, m: u64) -> GroupElement {
        return self.f.pow(&Exponent::from_u64(m, &self.q));
    }

    /// True iff the element lives in the group (Z/p)* of this key
    pub fn owns(&self, elem: &GroupElement) -> bool {
        return elem.get_modulus() == self.get_p();
    }
}
