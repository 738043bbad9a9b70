//! Keys and logging shared by the unit tests
use crate::{
    arithmetics::{Exponent, GroupElement, Modulus},
    keys::PublicKey,
    BigInt,
};
use crypto_bigint::rand_core::CryptoRngCore;
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

fn from_hex(hex: &str) -> BigInt {
    return BigInt::from_be_hex(&format!("{:0>width$}", hex, width = BigInt::BITS / 4));
}

/// A fixed 256-bit safe prime group, so that tests do not pay for prime generation
pub fn fixture_key() -> PublicKey {
    let p = from_hex("b14cb195fb0102da9f68824427bc9eb8a3b5a32db8a675d02a27a15d56a14893");
    let g = from_hex("6ffe6789943cf36bfc805e6e52409448f61925665592c1c49c7d8ad2743bb897");
    let h = from_hex("518845e1c4233682d44527ba05d84b6ec912832ff2c645d048eaaa2b888e340b");
    let f = from_hex("37625afc201bf51bc36e4b3a7eee249791c5a4534d958fa66247aa13cead84ad");
    return PublicKey::new(p, g, h, f).expect("fixture key is valid");
}

/// Sample a square other than 1. Squares are the quadratic residues, which is exactly the
/// order-q subgroup of a safe prime group.
fn random_square(rng: &mut impl CryptoRngCore, p: &Modulus) -> BigInt {
    loop {
        let a = p.random(rng);
        if let Some(a) = GroupElement::new(&a, p) {
            let square = (a * a).retrieve();
            if square != BigInt::ONE {
                return square;
            }
        }
    }
}

/// Generate a fresh group of the given size
pub fn random_key(rng: &mut impl CryptoRngCore, bits: usize) -> PublicKey {
    let p: BigInt = crypto_primes::generate_safe_prime_with_rng(rng, Some(bits));
    let modulus = Modulus::new(&p).unwrap();
    let g = random_square(rng, &modulus);
    let f = random_square(rng, &modulus);
    let throwaway = PublicKey::new(p, g, f, f).expect("generated key is valid");
    let secret = Exponent::random(rng, throwaway.get_q_modulus());
    let h = throwaway.get_g().pow(&secret);
    return PublicKey::new(p, g, h.retrieve(), f).expect("generated key is valid");
}

pub const TEST_TARGET: &str = "eeg_membership";

pub fn setup_test_tracing() -> tracing::subscriber::DefaultGuard {
    let filter = filter::Targets::new().with_target(TEST_TARGET, tracing::Level::DEBUG);

    return tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .with(filter)
        .set_default();
}
