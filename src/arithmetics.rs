//! Arithmetics in the order-q subgroup of (Z/p)* and in its exponent ring Z/q, where p = 2q + 1
//! is a safe prime.
//!
//! Elements and exponents are separate types so that the two moduli can never be mixed up:
//! a group element can only be raised to an exponent, and exponents only combine with each
//! other.
use crate::{BigInt, LIMBS};
use crypto_bigint::{
    modular::runtime_mod::{DynResidue, DynResidueParams},
    rand_core::CryptoRngCore,
    subtle::{Choice, ConditionallySelectable, ConstantTimeEq},
    Limb, NonZero, RandomMod, WideWord, Word,
};
use std::{
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
};

/// An odd modulus greater than one, with its Montgomery parameters precomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Modulus {
    value: NonZero<BigInt>,
    params: DynResidueParams<LIMBS>,
    bits: usize,
}

impl Modulus {
    /// Return None if the modulus is even or smaller than 3
    pub fn new(value: &BigInt) -> Option<Self> {
        if value.as_words()[0] & 1 == 0 || *value == BigInt::ONE {
            return None;
        }
        let nonzero: Option<NonZero<BigInt>> = NonZero::new(*value).into();
        return nonzero.map(|nonzero| Self {
            value: nonzero,
            params: DynResidueParams::new(value),
            bits: value.bits_vartime(),
        });
    }

    pub fn get_value(&self) -> &BigInt {
        return &self.value;
    }

    pub fn get_params(&self) -> &DynResidueParams<LIMBS> {
        return &self.params;
    }

    /// Number of significant bits of the modulus
    pub fn bits(&self) -> usize {
        return self.bits;
    }

    /// Sample uniformly from [0, m)
    pub fn random(&self, rng: &mut impl CryptoRngCore) -> BigInt {
        return BigInt::random_mod(rng, &self.value);
    }
}

/// A non-zero residue modulo the prime p
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupElement {
    val: DynResidue<LIMBS>,
}

impl GroupElement {
    /// Lift an integer into (Z/p)*. Zero and anything not below p are rejected, so every
    /// element is invertible.
    pub fn new(val: &BigInt, modulus: &Modulus) -> Option<Self> {
        if *val == BigInt::ZERO || val >= modulus.get_value() {
            return None;
        }
        return Some(Self {
            val: DynResidue::new(val, *modulus.get_params()),
        });
    }

    pub fn retrieve(&self) -> BigInt {
        return self.val.retrieve();
    }

    pub fn get_modulus(&self) -> &BigInt {
        return self.val.params().modulus();
    }

    /// Raise to an exponent. The loop runs over the bit length of q rather than the bit length
    /// of the exponent, so the running time does not depend on the exponent's value.
    pub fn pow(&self, exp: &Exponent) -> Self {
        return Self {
            val: self.val.pow_bounded_exp(&exp.retrieve(), exp.bound()),
        };
    }
}

impl Mul for GroupElement {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        return Self {
            val: self.val * rhs.val,
        };
    }
}

impl Div for GroupElement {
    type Output = Self;

    /// Multiply by the modular inverse. Every element is non-zero mod a prime, hence invertible.
    fn div(self, rhs: Self) -> Self {
        let (inverse, _) = rhs.val.invert();
        return Self {
            val: self.val * inverse,
        };
    }
}

impl ConstantTimeEq for GroupElement {
    fn ct_eq(&self, other: &Self) -> Choice {
        return self.retrieve().ct_eq(&other.retrieve());
    }
}

impl ConditionallySelectable for GroupElement {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let selected = BigInt::conditional_select(&a.retrieve(), &b.retrieve(), choice);
        return Self {
            val: DynResidue::new(&selected, *a.val.params()),
        };
    }
}

impl fmt::Display for GroupElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&to_decimal(&self.retrieve()));
    }
}

/// An element of the exponent ring Z/q
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exponent {
    val: DynResidue<LIMBS>,
    bound: usize,
}

impl Exponent {
    /// Reduce an arbitrary integer modulo q
    pub fn new(val: &BigInt, modulus: &Modulus) -> Self {
        // DynResidue::new reduces any input below 2^BITS
        return Self {
            val: DynResidue::new(val, *modulus.get_params()),
            bound: modulus.bits(),
        };
    }

    pub fn zero(modulus: &Modulus) -> Self {
        return Self::new(&BigInt::ZERO, modulus);
    }

    pub fn from_u64(val: u64, modulus: &Modulus) -> Self {
        return Self::new(&BigInt::from_u64(val), modulus);
    }

    /// Sample uniformly from [0, q)
    pub fn random(rng: &mut impl CryptoRngCore, modulus: &Modulus) -> Self {
        return Self::new(&modulus.random(rng), modulus);
    }

    /// Interpret the bytes as a big-endian integer and reduce it modulo q. Inputs wider than
    /// BigInt keep their low-order bytes.
    pub fn from_be_bytes(bytes: &[u8], modulus: &Modulus) -> Self {
        let mut buf = vec![0u8; Limb::BYTES * LIMBS];
        let len = bytes.len().min(buf.len());
        let offset = buf.len() - len;
        buf[offset..].copy_from_slice(&bytes[bytes.len() - len..]);
        return Self::new(&BigInt::from_be_slice(&buf), modulus);
    }

    pub fn retrieve(&self) -> BigInt {
        return self.val.retrieve();
    }

    fn bound(&self) -> usize {
        return self.bound;
    }
}

impl Add for Exponent {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        return Self {
            val: self.val + rhs.val,
            bound: self.bound,
        };
    }
}

impl Sub for Exponent {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        return Self {
            val: self.val - rhs.val,
            bound: self.bound,
        };
    }
}

impl Mul for Exponent {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        return Self {
            val: self.val * rhs.val,
            bound: self.bound,
        };
    }
}

impl Neg for Exponent {
    type Output = Self;

    fn neg(self) -> Self {
        return Self {
            val: -self.val,
            bound: self.bound,
        };
    }
}

impl ConditionallySelectable for Exponent {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let selected = BigInt::conditional_select(&a.retrieve(), &b.retrieve(), choice);
        return Self {
            val: DynResidue::new(&selected, *a.val.params()),
            bound: a.bound,
        };
    }
}

impl fmt::Display for Exponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&to_decimal(&self.retrieve()));
    }
}

/// Largest power of ten that fits in a word on every platform
const DECIMAL_CHUNK: Word = 1_000_000_000;

/// Render the integer in base 10 without leading zeros
pub fn to_decimal(val: &BigInt) -> String {
    let mut words = *val.as_words();
    let mut chunks: Vec<Word> = vec![];

    while words.iter().any(|word| *word != 0) {
        let mut rem: WideWord = 0;
        for word in words.iter_mut().rev() {
            let acc = (rem << Word::BITS) | (*word as WideWord);
            *word = (acc / DECIMAL_CHUNK as WideWord) as Word;
            rem = acc % DECIMAL_CHUNK as WideWord;
        }
        chunks.push(rem as Word);
    }

    return match chunks.split_last() {
        None => "0".to_string(),
        Some((leading, rest)) => {
            let mut out = leading.to_string();
            for chunk in rest.iter().rev() {
                out.push_str(&format!("{:09}", chunk));
            }
            out
        }
    };
}

/// Parse a run of decimal digits. Return None on an empty string, on any non-digit, or if the
/// value does not fit in BigInt.
pub fn from_decimal(text: &str) -> Option<BigInt> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut words = [0 as Word; LIMBS];
    for digit in text.bytes() {
        let mut carry = (digit - b'0') as WideWord;
        for word in words.iter_mut() {
            let acc = (*word as WideWord) * 10 + carry;
            *word = acc as Word;
            carry = acc >> Word::BITS;
        }
        if carry != 0 {
            return None;
        }
    }
    return Some(BigInt::from_words(words));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_decimal_small_values() {
        assert_eq!(to_decimal(&BigInt::ZERO), "0");
        assert_eq!(to_decimal(&BigInt::from_u64(7)), "7");
        assert_eq!(to_decimal(&BigInt::from_u64(1_000_000_000)), "1000000000");
        assert_eq!(to_decimal(&BigInt::from_u64(u64::MAX)), "18446744073709551615");
        assert_eq!(from_decimal("0"), Some(BigInt::ZERO));
        assert_eq!(from_decimal("0042"), Some(BigInt::from_u64(42)));
    }

    #[test]
    fn test_decimal_wide_value() {
        let pk = test_utils::fixture_key();
        let text = to_decimal(pk.get_p());
        assert_eq!(
            text,
            "80194880228730544457502541931219286137754763978974113817243178635887676311699"
        );
        assert_eq!(from_decimal(&text).as_ref(), Some(pk.get_p()));
    }

    #[test]
    fn test_decimal_rejects_garbage() {
        assert!(from_decimal("").is_none());
        assert!(from_decimal("12a4").is_none());
        assert!(from_decimal("-5").is_none());
        // 10^617 does not fit in 2048 bits
        let too_wide = format!("1{}", "0".repeat(617));
        assert!(from_decimal(&too_wide).is_none());
    }

    #[test]
    fn test_modulus_rejects_even() {
        assert!(Modulus::new(&BigInt::from_u64(10)).is_none());
        assert!(Modulus::new(&BigInt::ONE).is_none());
        assert!(Modulus::new(&BigInt::from_u64(11)).is_some());
    }

    #[test]
    fn test_group_division_inverts_multiplication() {
        let mut rng = StdRng::seed_from_u64(1);
        let pk = test_utils::fixture_key();
        let a = pk.get_g().pow(&Exponent::random(&mut rng, pk.get_q_modulus()));
        let b = pk.get_h().pow(&Exponent::random(&mut rng, pk.get_q_modulus()));
        assert_eq!((a * b) / b, a);
        assert_eq!((a / a).retrieve(), BigInt::ONE);
    }

    #[test]
    fn test_exponent_laws() {
        let mut rng = StdRng::seed_from_u64(2);
        let pk = test_utils::fixture_key();
        let q = pk.get_q_modulus();
        let g = *pk.get_g();
        let a = Exponent::random(&mut rng, q);
        let b = Exponent::random(&mut rng, q);

        assert_eq!(g.pow(&(a + b)), g.pow(&a) * g.pow(&b));
        assert_eq!(g.pow(&(a - b)), g.pow(&a) / g.pow(&b));
        assert_eq!(g.pow(&(a * b)), g.pow(&a).pow(&b));
        assert_eq!(g.pow(&-a) * g.pow(&a), g.pow(&Exponent::zero(q)));
        // g has order q, so reducing the exponent mod q does not change the power
        assert_eq!(g.pow(&Exponent::new(q.get_value(), q)).retrieve(), BigInt::ONE);
    }

    #[test]
    fn test_conditional_select() {
        let pk = test_utils::fixture_key();
        let g = *pk.get_g();
        let h = *pk.get_h();
        assert_eq!(GroupElement::conditional_select(&g, &h, Choice::from(0)), g);
        assert_eq!(GroupElement::conditional_select(&g, &h, Choice::from(1)), h);
        assert!(bool::from(g.ct_eq(&g)));
        assert!(!bool::from(g.ct_eq(&h)));
    }

    #[test]
    fn test_exponent_from_bytes_reduces() {
        let q = Modulus::new(&BigInt::from_u64(1019)).unwrap();
        let e = Exponent::from_be_bytes(&[0x01, 0x00, 0x00], &q);
        assert_eq!(e.retrieve(), BigInt::from_u64(65536 % 1019));
    }
}
