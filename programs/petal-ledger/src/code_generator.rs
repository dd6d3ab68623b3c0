use anchor_lang::solana_program::hash::hashv;

use crate::checksum;
use crate::constants::*;
use crate::states::CodeType;

/// A freshly generated redemption code. `code` already ends with `checksum`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedCode {
    pub code: String,
    pub checksum: String,
}

/// Builds `prefix + random + checksum`, drawing `total_len - prefix.len()`
/// characters uniformly from `A-Z0-9`.
///
/// Randomness is expanded from `entropy` with SHA-256 in counter mode, so the
/// caller decides where the entropy comes from (an OS RNG off-chain, a slot
/// hash on-chain). The same entropy always yields the same code.
pub fn generate(prefix: &str, total_len: usize, entropy: &[u8]) -> GeneratedCode {
    let wanted = total_len.saturating_sub(prefix.len());
    let mut body = String::with_capacity(total_len + 2);
    body.push_str(prefix);

    let mut drawn = 0;
    let mut counter: u64 = 0;
    while drawn < wanted {
        let block = hashv(&[entropy, &counter.to_le_bytes()]).to_bytes();
        counter += 1;
        for byte in block {
            if drawn == wanted {
                break;
            }
            // 252 = 7 * 36: rejecting the top four values keeps the draw uniform
            if byte >= 252 {
                continue;
            }
            body.push(CODE_ALPHABET[(byte % 36) as usize] as char);
            drawn += 1;
        }
    }

    let checksum = checksum::checksum(&body);
    body.push_str(&checksum);
    GeneratedCode {
        code: body,
        checksum,
    }
}

/// Generates a code with the standard prefix and body length for `code_type`.
pub fn generate_for(code_type: CodeType, entropy: &[u8]) -> GeneratedCode {
    generate(code_type.prefix(), CODE_BODY_LEN, entropy)
}

/// The form codes are stored and addressed under: surrounding whitespace
/// dropped, ASCII letters uppercased.
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Only `A-Z0-9`, i.e. already in the form [`normalize`] produces.
pub fn is_canonical(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

/// Fails closed: anything shorter than three characters, or whose last two
/// characters are not the checksum of the rest, is invalid.
pub fn validate(code: &str) -> bool {
    if code.len() < 3 {
        return false;
    }
    let split = code.len() - 2;
    if !code.is_char_boundary(split) {
        return false;
    }
    let (body, claimed) = code.split_at(split);
    checksum::verify(body, claimed)
}

/// Checksum-valid and carrying the prefix issued for `code_type`.
pub fn validate_for(code: &str, code_type: CodeType) -> bool {
    validate(code) && code.starts_with(code_type.prefix())
}
