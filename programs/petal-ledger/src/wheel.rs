//! Weighted prize wheel.
//!
//! Selection is fixed by one uniform draw; the presentation angle is derived
//! from the same seed only after the winner is known and never feeds back
//! into selection.

use anchor_lang::solana_program::hash::hashv;

use crate::constants::*;
use crate::cooldown::CooldownPolicy;
use crate::errors::LoyaltyError;
use crate::ledger::Posting;
use crate::states::{Balance, EntryKind, Prize, PrizeKind};

type WheelResult<T> = core::result::Result<T, LoyaltyError>;

fn prize(id: &str, kind: PrizeKind, value: u32, label: &str, probability: f64, color: &str) -> Prize {
    Prize {
        id: id.to_string(),
        kind,
        value,
        label: label.to_string(),
        probability,
        color: color.to_string(),
    }
}

/// Built-in table used when the config carries no prizes.
pub fn default_prizes() -> Vec<Prize> {
    vec![
        prize("petals_2", PrizeKind::Petals, 2, "+2 petals", 0.25, "#FFB6C1"),
        prize("petals_5", PrizeKind::Petals, 5, "+5 petals", 0.20, "#FF69B4"),
        prize("discount_5", PrizeKind::Discount, 5, "5% off", 0.15, "#DDA0DD"),
        prize("petals_10", PrizeKind::Petals, 10, "+10 petals", 0.15, "#FF1493"),
        prize("discount_10", PrizeKind::Discount, 10, "10% off", 0.10, "#BA55D3"),
        prize("gift_bouquet", PrizeKind::Gift, 1, "Mini bouquet", 0.10, "#9370DB"),
        prize("petals_20", PrizeKind::Petals, 20, "+20 petals", 0.04, "#8B008B"),
        prize("gift_large", PrizeKind::Gift, 2, "Large bouquet", 0.01, "#4B0082"),
    ]
}

/// The active prize table: the configured one, or the built-in fallback.
pub fn configuration(configured: &[Prize]) -> Vec<Prize> {
    if configured.is_empty() {
        default_prizes()
    } else {
        configured.to_vec()
    }
}

/// Cumulative weighted selection for `r` in `[0, 1)`.
///
/// Zero-weight prizes are never chosen. When `r` lies above the summed
/// weights the first prize wins. `None` only for an empty table.
pub fn select_prize(prizes: &[Prize], r: f64) -> Option<usize> {
    if prizes.is_empty() {
        return None;
    }
    let mut cumulative = 0.0;
    for (index, prize) in prizes.iter().enumerate() {
        if prize.probability <= 0.0 {
            continue;
        }
        cumulative += prize.probability;
        if r <= cumulative {
            return Some(index);
        }
    }
    Some(0)
}

/// Seed for one spin. Mixes the recent slot hash with caller and ledger
/// state so two spins never share a seed.
pub fn draw_seed(slot_hash: &[u8], user_id: &str, nonce: u64, seq: u64) -> [u8; 32] {
    hashv(&[
        slot_hash,
        user_id.as_bytes(),
        &nonce.to_le_bytes(),
        &seq.to_le_bytes(),
    ])
    .to_bytes()
}

fn word(seed: &[u8; 32], index: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&seed[index * 8..index * 8 + 8]);
    u64::from_be_bytes(bytes)
}

fn unit_from_word(w: u64) -> f64 {
    // 53 bits is the f64 mantissa; the result is exactly representable
    (w >> 11) as f64 / (1u64 << 53) as f64
}

/// Uniform value in `[0, 1)` taken from the first word of `seed`.
pub fn unit_interval(seed: &[u8; 32]) -> f64 {
    unit_from_word(word(seed, 0))
}

/// Degrees the wheel turns so that it stops inside sector `winner`.
///
/// `rotations * 360 + sector centre + jitter`, with whole rotations so the
/// final resting position (mod 360) always falls in the winning sector.
pub fn presentation_angle(prize_count: usize, winner: usize, seed: &[u8; 32]) -> f64 {
    if prize_count == 0 {
        return 0.0;
    }
    let sector = 360.0 / prize_count as f64;
    let rotations = WHEEL_MIN_ROTATIONS + word(seed, 1) % WHEEL_ROTATION_SPAN;
    let center = winner as f64 * sector + sector / 2.0;
    let jitter = (unit_from_word(word(seed, 2)) - 0.5) * sector * WHEEL_JITTER_SHARE;
    rotations as f64 * 360.0 + center + jitter
}

/// Ledger memo describing a prize.
pub fn prize_memo(prize: &Prize) -> String {
    format!(
        "prize_id={};prize_type={};prize_value={};prize_label={}",
        prize.id,
        prize.kind.as_str(),
        prize.value,
        prize.label
    )
}

/// Credits a prize. Discounts and gifts are logged as zero-value wins;
/// their fulfilment happens through the reward catalogue.
pub fn payout(balance: &mut Balance, prize: &Prize) -> WheelResult<Posting> {
    let amount = match prize.kind {
        PrizeKind::Petals => u64::from(prize.value),
        PrizeKind::Discount | PrizeKind::Gift => 0,
    };
    balance.credit(amount, EntryKind::WheelWin, prize_memo(prize))
}

pub fn prize_message(prize: &Prize) -> String {
    match prize.kind {
        PrizeKind::Petals => format!("Congratulations! You won {} petals!", prize.value),
        PrizeKind::Discount => format!("Congratulations! You won a {}% discount!", prize.value),
        PrizeKind::Gift => format!("Congratulations! You won {}!", prize.label),
    }
}

/// Result of one accepted spin.
#[derive(Clone, Debug, PartialEq)]
pub struct SpinOutcome {
    pub prize_index: usize,
    pub prize: Prize,
    pub angle: f64,
    pub posting: Posting,
}

/// Consumes a spin credit, selects a prize and pays it out.
///
/// On any error the balance is left as it was.
pub fn spin(
    balance: &mut Balance,
    prizes: &[Prize],
    seed: &[u8; 32],
    now: i64,
    policy: &CooldownPolicy,
) -> WheelResult<SpinOutcome> {
    if prizes.is_empty() {
        return Err(LoyaltyError::InvalidConfig);
    }
    let (credits_before, last_spin_before) = (balance.spin_credits, balance.last_spin_at);
    balance.consume_spin_credit(now, policy)?;

    let prize_index = select_prize(prizes, unit_interval(seed)).unwrap_or(0);
    let prize = prizes[prize_index].clone();
    let posting = match payout(balance, &prize) {
        Ok(posting) => posting,
        Err(err) => {
            balance.spin_credits = credits_before;
            balance.last_spin_at = last_spin_before;
            return Err(err);
        }
    };

    Ok(SpinOutcome {
        prize_index,
        angle: presentation_angle(prizes.len(), prize_index, seed),
        prize,
        posting,
    })
}
