//! Reward catalogue and order-amount bands.

use anchor_lang::solana_program::hash::hashv;

use crate::errors::LoyaltyError;
use crate::ledger::Posting;
use crate::states::{Balance, EntryKind, OrderBand, RewardItem, RewardKind};

type EconomyResult<T> = core::result::Result<T, LoyaltyError>;

fn reward(id: &str, name: &str, petals_cost: u64, kind: RewardKind, value: u32) -> RewardItem {
    RewardItem {
        id: id.to_string(),
        name: name.to_string(),
        petals_cost,
        kind,
        value,
        is_active: true,
    }
}

pub fn default_rewards() -> Vec<RewardItem> {
    vec![
        reward("discount_5", "5% discount", 10, RewardKind::Discount, 5),
        reward("discount_10", "10% discount", 20, RewardKind::Discount, 10),
        reward("discount_15", "15% discount", 35, RewardKind::Discount, 15),
        reward("mini_bouquet", "Mini bouquet", 50, RewardKind::Gift, 1),
        reward("certificate_500", "500 gift certificate", 100, RewardKind::Gift, 500),
        reward("large_bouquet", "Large bouquet", 200, RewardKind::Gift, 2),
    ]
}

pub fn default_order_bands() -> Vec<OrderBand> {
    let band = |min_amount, max_amount, petals, spins| OrderBand {
        min_amount,
        max_amount,
        petals,
        spins,
    };
    vec![
        band(1_500, 1_999, 2, 0),
        band(2_000, 2_999, 3, 1),
        band(3_000, 4_999, 5, 1),
        band(5_000, 9_999, 8, 1),
        band(10_000, 999_999, 15, 1),
    ]
}

pub fn reward_catalogue(configured: &[RewardItem]) -> Vec<RewardItem> {
    if configured.is_empty() {
        default_rewards()
    } else {
        configured.to_vec()
    }
}

pub fn order_bands(configured: &[OrderBand]) -> Vec<OrderBand> {
    if configured.is_empty() {
        default_order_bands()
    } else {
        configured.to_vec()
    }
}

/// Looks up an exchangeable catalogue item.
pub fn find_reward<'a>(catalogue: &'a [RewardItem], reward_id: &str) -> EconomyResult<&'a RewardItem> {
    let item = catalogue
        .iter()
        .find(|item| item.id == reward_id)
        .ok_or(LoyaltyError::RewardNotFound)?;
    if !item.is_active {
        return Err(LoyaltyError::RewardInactive);
    }
    Ok(item)
}

/// Petals and spin credits an order of `amount` earns.
pub fn order_reward(bands: &[OrderBand], amount: u64) -> EconomyResult<OrderBand> {
    bands
        .iter()
        .find(|band| (band.min_amount..=band.max_amount).contains(&amount))
        .copied()
        .ok_or(LoyaltyError::NoOrderBand)
}

/// Spends the item's cost from `balance`.
pub fn exchange(balance: &mut Balance, item: &RewardItem) -> EconomyResult<Posting> {
    let memo = format!(
        "reward_id={};reward_name={};petals_cost={}",
        item.id, item.name, item.petals_cost
    );
    balance.debit(item.petals_cost, EntryKind::RewardExchange, memo)
}

/// Entropy for the REWARD code minted by an exchange. Derived from ledger
/// state so a client can compute the code (and its address) up front.
pub fn reward_code_entropy(user_id: &str, seq: u64) -> [u8; 32] {
    hashv(&[b"reward", user_id.as_bytes(), &seq.to_le_bytes()]).to_bytes()
}
