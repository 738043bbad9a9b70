//! A sample election procedure: every voter encrypts a 0/1 ballot with a proof of validity, the
//! ballots are multiplied into an encrypted tally whose proof is composed along the way, and the
//! tally proof travels through its text form before it is checked.
use clap::Parser;
use eeg_membership::{
    arithmetics::{Exponent, GroupElement, Modulus},
    BigInt, Ciphertext, Domain, MembershipProof, Proof, PublicKey,
};
use anyhow::{anyhow, bail, Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Encrypt, tally and verify a yes/no election")]
struct Args {
    /// Number of voters
    #[arg(long, default_value_t = 10)]
    voters: usize,

    /// Bit length of the safe prime p
    #[arg(long, default_value_t = 256)]
    bits: usize,

    /// Seed for a reproducible run; fresh OS randomness otherwise
    #[arg(long)]
    seed: Option<u64>,
}

/// Sample a quadratic residue other than 1, i.e. an element of the order-q subgroup
fn sample_square(rng: &mut StdRng, p: &Modulus) -> BigInt {
    loop {
        if let Some(a) = GroupElement::new(&p.random(rng), p) {
            let square = (a * a).retrieve();
            if square != BigInt::ONE {
                return square;
            }
        }
    }
}

/// Stand-in for the key ceremony: returns the public key and the private exponent x, h = g^x
fn keygen(rng: &mut StdRng, bits: usize) -> Result<(PublicKey, Exponent)> {
    let p: BigInt = crypto_primes::generate_safe_prime_with_rng(rng, Some(bits));
    let modulus = Modulus::new(&p).ok_or_else(|| anyhow!("generated prime is even"))?;
    let g = sample_square(rng, &modulus);
    let f = sample_square(rng, &modulus);
    let group = PublicKey::new(p, g, f, f).context("failed to assemble the group parameters")?;
    let x = Exponent::random(rng, group.get_q_modulus());
    let h = group.get_g().pow(&x).retrieve();
    let pk = PublicKey::new(p, g, h, f).context("failed to assemble the election key")?;
    return Ok((pk, x));
}

/// Brute-force discrete log of H / G^x to base f, searching the tally domain
fn decrypt(ctext: &Ciphertext, x: &Exponent, pk: &PublicKey, domain: &Domain) -> Option<u64> {
    let encoded = *ctext.get_big_h() / ctext.get_big_g().pow(x);
    return domain
        .values()
        .iter()
        .copied()
        .find(|m| pk.encode(*m) == encoded);
}

fn run(args: &Args) -> Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    if args.voters == 0 {
        bail!("at least one voter is required");
    }
    if args.bits < 16 || args.bits > BigInt::BITS {
        bail!("prime size must be between 16 and {} bits", BigInt::BITS);
    }

    let (pk, x) = keygen(&mut rng, args.bits)?;
    info!(bits = args.bits, "generated election key");

    let ballot_domain = Domain::range(0, 1)?;
    let mut true_tally = 0u64;
    let mut tally: Option<(Ciphertext, Exponent, Domain)> = None;

    for voter in 0..args.voters {
        let vote = rng.gen::<bool>() as u64;
        let (ballot, r) = Ciphertext::encrypt(&pk, vote, &ballot_domain, &mut rng)
            .with_context(|| format!("failed to encrypt the ballot of voter {}", voter))?;
        if !ballot.verify(&pk, &ballot_domain)? {
            bail!("ballot of voter {} failed to verify", voter);
        }
        true_tally += vote;

        tally = Some(match tally {
            None => (ballot, r, ballot_domain.clone()),
            Some((acc, acc_r, acc_domain)) => {
                let merged = Domain::sum(&acc_domain, &ballot_domain)?;
                let (sum, sum_r) = acc
                    .combine(
                        &acc_r,
                        &acc_domain,
                        &ballot,
                        &r,
                        &ballot_domain,
                        &merged,
                        &pk,
                        &mut rng,
                    )
                    .with_context(|| format!("failed to add the ballot of voter {}", voter))?;
                (sum, sum_r, merged)
            }
        });
    }
    let (tally, _, tally_domain) = tally.ok_or_else(|| anyhow!("no ballots were cast"))?;

    // Publish the tally proof in its text form and check what the auditors receive
    let published = tally.get_proof().encode();
    info!(bytes = published.len(), "published tally proof");
    let received = MembershipProof::from_verbatim(published.as_bytes())
        .context("failed to decode the published tally proof")?;
    if !received.verify(&tally, &pk, &tally_domain)? {
        bail!("the tally proof failed to verify");
    }

    let decryption = decrypt(&tally, &x, &pk, &tally_domain)
        .ok_or_else(|| anyhow!("tally is outside its domain"))?;
    if decryption != true_tally {
        bail!(
            "the final tally is incorrect: decrypted {}, expected {}",
            decryption,
            true_tally
        );
    }
    info!(tally = decryption, voters = args.voters, "the election is a success");
    return Ok(());
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    return run(&args);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_election() {
        let args = Args {
            voters: 5,
            bits: 32,
            seed: Some(7),
        };
        assert!(run(&args).is_ok());
    }

    #[test]
    fn test_rejects_bad_arguments() {
        let args = Args {
            voters: 0,
            bits: 32,
            seed: Some(7),
        };
        let err = run(&args).unwrap_err();
        assert_eq!(err.to_string(), "at least one voter is required");

        let args = Args {
            voters: 3,
            bits: 4096,
            seed: Some(7),
        };
        assert!(run(&args).is_err());
    }
}
