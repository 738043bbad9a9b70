//! Canonical text form of a membership proof.
//!
//! ```text
//! proof  := "p" num ("y" num){k} ("z" num){k} ("s" num){k} ("c" num){k}
//! num    := [0-9]+
//! ```
//!
//! Counting tags and numbers separately, a well-formed string has 8k + 2 tokens. q is not
//! transmitted; it is (p - 1) / 2.
use crate::{
    arithmetics::{from_decimal, to_decimal},
    error::ProofError,
    proofs::membership::MembershipProof,
    BigInt,
};
use std::{fmt, str::FromStr};

const LOG_TARGET: &str = "eeg_membership::codec";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    P,
    Y,
    Z,
    S,
    C,
}

impl Tag {
    fn from_char(c: char) -> Option<Self> {
        return match c {
            'p' => Some(Self::P),
            'y' => Some(Self::Y),
            'z' => Some(Self::Z),
            's' => Some(Self::S),
            'c' => Some(Self::C),
            _ => None,
        };
    }

    fn as_char(&self) -> char {
        return match self {
            Self::P => 'p',
            Self::Y => 'y',
            Self::Z => 'z',
            Self::S => 's',
            Self::C => 'c',
        };
    }
}

fn malformed(reason: String) -> ProofError {
    tracing::debug!(target: LOG_TARGET, %reason, "rejecting proof text");
    return ProofError::MalformedProofText(reason);
}

/// Split the text into (tag, digits) pairs. Anything that is neither a tag nor a digit, a tag
/// without digits, or digits without a tag is a grammar violation.
fn tokenize(text: &str) -> Result<Vec<(Tag, &str)>, ProofError> {
    let mut pairs = vec![];
    let mut rest = text;
    while let Some(first) = rest.chars().next() {
        let tag = Tag::from_char(first).ok_or_else(|| {
            malformed(format!(
                "expected a tag at offset {}, found {:?}",
                text.len() - rest.len(),
                first
            ))
        })?;
        let body = &rest[1..];
        let digits_end = body
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(body.len());
        if digits_end == 0 {
            return Err(malformed(format!(
                "tag `{}` at offset {} has no value",
                tag.as_char(),
                text.len() - rest.len()
            )));
        }
        pairs.push((tag, &body[..digits_end]));
        rest = &body[digits_end..];
    }
    return Ok(pairs);
}

/// Parse one run of k values under the expected tag, each strictly below the bound
fn parse_run(
    pairs: &[(Tag, &str)],
    expected: Tag,
    bound: &BigInt,
) -> Result<Vec<BigInt>, ProofError> {
    return pairs
        .iter()
        .map(|(tag, digits)| {
            if *tag != expected {
                return Err(malformed(format!(
                    "expected token: `{}`, found `{}`",
                    expected.as_char(),
                    tag.as_char()
                )));
            }
            let val = from_decimal(digits)
                .ok_or_else(|| malformed(format!("value `{}` is too large", digits)))?;
            if val >= *bound {
                return Err(malformed(format!(
                    "`{}` value is out of range",
                    expected.as_char()
                )));
            }
            Ok(val)
        })
        .collect();
}

impl MembershipProof {
    /// The canonical text form
    pub fn encode(&self) -> String {
        return self.to_string();
    }

    /// Parse the canonical text form. Any deviation from the grammar is `MalformedProofText`;
    /// whether the proof is valid is a separate question for `verify`.
    pub fn decode(text: &str) -> Result<Self, ProofError> {
        let pairs = tokenize(text)?;
        let tokens = pairs.len() * 2;
        if tokens < 2 || (tokens - 2) % 8 != 0 {
            return Err(malformed(format!(
                "number of tokens ({}) is not of the form 8k + 2",
                tokens
            )));
        }
        let k = (tokens - 2) / 8;

        let (p_tag, p_digits) = pairs[0];
        if p_tag != Tag::P {
            return Err(malformed(format!(
                "expected token: `p`, found `{}`",
                p_tag.as_char()
            )));
        }
        let p = from_decimal(p_digits)
            .ok_or_else(|| malformed("prime is too large".to_string()))?;
        if p < BigInt::from_u8(5) || p.as_words()[0] & 1 == 0 {
            return Err(malformed("prime must be odd and at least 5".to_string()));
        }
        let q = p.wrapping_sub(&BigInt::ONE) >> 1;

        let runs = &pairs[1..];
        let y_list = parse_run(&runs[..k], Tag::Y, &p)?;
        let z_list = parse_run(&runs[k..2 * k], Tag::Z, &p)?;
        let s_list = parse_run(&runs[2 * k..3 * k], Tag::S, &q)?;
        let c_list = parse_run(&runs[3 * k..], Tag::C, &q)?;

        return Ok(Self::new(p, q, y_list, z_list, s_list, c_list));
    }

    /// Decode a proof carried as an opaque byte payload inside a transport message. Bytes that
    /// are not text are reported like any other malformed proof.
    pub fn from_verbatim(payload: &[u8]) -> Result<Self, ProofError> {
        let text = std::str::from_utf8(payload)
            .map_err(|err| malformed(format!("payload is not valid UTF-8: {}", err)))?;
        return Self::decode(text);
    }
}

impl fmt::Display for MembershipProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", to_decimal(self.get_p()))?;
        let runs = [
            (Tag::Y, self.get_y_list()),
            (Tag::Z, self.get_z_list()),
            (Tag::S, self.get_s_list()),
            (Tag::C, self.get_c_list()),
        ];
        for (tag, values) in runs {
            for val in values {
                write!(f, "{}{}", tag.as_char(), to_decimal(val))?;
            }
        }
        return Ok(());
    }
}

impl FromStr for MembershipProof {
    type Err = ProofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return Self::decode(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ciphertext::Ciphertext, proofs::domain::Domain, test_utils};
    use rand::{rngs::StdRng, SeedableRng};

    fn is_malformed(res: Result<MembershipProof, ProofError>) -> bool {
        return matches!(res, Err(ProofError::MalformedProofText(_)));
    }

    #[test]
    fn test_round_trip() {
        let mut rng = StdRng::seed_from_u64(400);
        let pk = test_utils::fixture_key();
        let domain = Domain::range(0, 3).unwrap();
        let (ctext, _) = Ciphertext::encrypt(&pk, 2, &domain, &mut rng).unwrap();
        let proof = ctext.get_proof();

        let text = proof.encode();
        assert!(text.starts_with(&format!("p{}y", to_decimal(pk.get_p()))));
        let decoded: MembershipProof = text.parse().unwrap();
        assert_eq!(&decoded, proof);
        assert_eq!(decoded.get_q(), pk.get_q());
        let (big_g, big_h) = (ctext.get_big_g(), ctext.get_big_h());
        assert_eq!(decoded.verify_pair(big_g, big_h, &pk, &domain), Ok(true));
    }

    #[test]
    fn test_exact_layout() {
        let proof = MembershipProof::new(
            BigInt::from_u64(23),
            BigInt::from_u64(11),
            vec![BigInt::from_u64(4), BigInt::from_u64(8)],
            vec![BigInt::from_u64(2), BigInt::from_u64(16)],
            vec![BigInt::from_u64(0), BigInt::from_u64(10)],
            vec![BigInt::from_u64(3), BigInt::from_u64(7)],
        );
        assert_eq!(proof.encode(), "p23y4y8z2z16s0s10c3c7");
        assert_eq!(MembershipProof::decode("p23y4y8z2z16s0s10c3c7"), Ok(proof));
    }

    #[test]
    fn test_empty_proof() {
        let proof = MembershipProof::decode("p23").unwrap();
        assert!(proof.is_empty());
        assert_eq!(proof.encode(), "p23");
    }

    #[test]
    fn test_reject_bad_token_count() {
        // 4 tokens
        assert!(is_malformed(MembershipProof::decode("p23y4")));
        // 20 tokens
        assert!(is_malformed(MembershipProof::decode("p23y4y8z2z16s0s10c3c7y1")));
        assert!(is_malformed(MembershipProof::decode("")));
    }

    #[test]
    fn test_reject_tag_out_of_order() {
        assert_eq!(
            MembershipProof::decode("p23y4z2y0c3"),
            Err(ProofError::MalformedProofText("expected token: `s`, found `y`".to_string()))
        );
        assert!(is_malformed(MembershipProof::decode("y23p4z2s0c3")));
    }

    #[test]
    fn test_reject_non_numeric() {
        assert!(is_malformed(MembershipProof::decode("p23y4z2s0cx")));
        assert!(is_malformed(MembershipProof::decode("p23y4z2s0c-3")));
        assert!(is_malformed(MembershipProof::decode("p23yz2s0c3")));
        assert!(is_malformed(MembershipProof::decode("p23 y4z2s0c3")));
    }

    #[test]
    fn test_reject_out_of_range() {
        // y must be below p, s and c below q = 11
        assert!(is_malformed(MembershipProof::decode("p23y23z2s0c3")));
        assert!(is_malformed(MembershipProof::decode("p23y4z2s11c3")));
        // p must be odd and at least 5
        assert!(is_malformed(MembershipProof::decode("p22y4z2s0c3")));
        assert!(is_malformed(MembershipProof::decode("p3y1z2s0c0")));
    }

    #[test]
    fn test_verbatim_payload() {
        let proof = MembershipProof::from_verbatim(b"p23y4z2s0c3").unwrap();
        assert_eq!(proof.len(), 1);
        assert!(is_malformed(MembershipProof::from_verbatim(&[0x70, 0xff, 0xfe])));
    }
}
