use anchor_lang::prelude::*;

use crate::constants::*;

/// Borsh size of a `String` holding at most `max` bytes.
const fn string_size(max: usize) -> usize {
    4 + max
}

// ---------------------------
// Shared enums
// ---------------------------

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CodeType {
    #[default]
    Order,
    Social,
    Reward,
}

impl CodeType {
    pub fn prefix(&self) -> &'static str {
        match self {
            CodeType::Order => ORDER_CODE_PREFIX,
            CodeType::Social => SOCIAL_CODE_PREFIX,
            CodeType::Reward => REWARD_CODE_PREFIX,
        }
    }

    /// Ledger reason recorded when a code of this type is activated.
    pub fn entry_kind(&self) -> EntryKind {
        match self {
            CodeType::Order | CodeType::Reward => EntryKind::PromoActivation,
            CodeType::Social => EntryKind::SocialActivity,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeType::Order => "ORDER",
            CodeType::Social => "SOCIAL",
            CodeType::Reward => "REWARD",
        }
    }
}

/// Reason attached to every ledger entry.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntryKind {
    #[default]
    PromoActivation,
    WheelWin,
    ReferralBonus,
    SocialActivity,
    RewardExchange,
    AdminAdjustment,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::PromoActivation => "PROMO_ACTIVATION",
            EntryKind::WheelWin => "WHEEL_WIN",
            EntryKind::ReferralBonus => "REFERRAL_BONUS",
            EntryKind::SocialActivity => "SOCIAL_ACTIVITY",
            EntryKind::RewardExchange => "REWARD_EXCHANGE",
            EntryKind::AdminAdjustment => "ADMIN_ADJUSTMENT",
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrizeKind {
    Petals,
    Discount,
    Gift,
}

impl PrizeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrizeKind::Petals => "petals",
            PrizeKind::Discount => "discount",
            PrizeKind::Gift => "gift",
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardKind {
    Discount,
    Gift,
}

// ---------------------------
// Config tables
// ---------------------------

/// One sector of the prize wheel.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct Prize {
    pub id: String,
    pub kind: PrizeKind,
    pub value: u32,
    pub label: String,
    pub probability: f64,
    pub color: String,
}

impl Prize {
    pub const SIZE: usize = string_size(MAX_PRIZE_ID_LEN)
        + 1
        + 4
        + string_size(MAX_PRIZE_LABEL_LEN)
        + 8
        + string_size(MAX_COLOR_LEN);
}

/// Catalogue item that petals can be exchanged for.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RewardItem {
    pub id: String,
    pub name: String,
    pub petals_cost: u64,
    pub kind: RewardKind,
    /// Discount percent for discounts, tier or face value for gifts.
    pub value: u32,
    pub is_active: bool,
}

impl RewardItem {
    pub const SIZE: usize =
        string_size(MAX_REWARD_ID_LEN) + string_size(MAX_REWARD_NAME_LEN) + 8 + 1 + 4 + 1;
}

/// Order-amount band of the economy table (bounds inclusive).
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderBand {
    pub min_amount: u64,
    pub max_amount: u64,
    pub petals: u64,
    pub spins: u8,
}

impl OrderBand {
    pub const SIZE: usize = 8 + 8 + 8 + 1;
}

// ---------------------------
// Accounts: State
// ---------------------------

/// Global configuration snapshot. Replaced wholesale by the admin.
#[account]
#[derive(Debug)]
pub struct LoyaltyConfig {
    pub admin: Pubkey,    // may replace the config
    pub operator: Pubkey, // trusted gateway that speaks for users
    pub referral_min_order: u64,
    pub invitee_bonus: u64,
    pub inviter_bonus: u64,
    pub referral_yearly_cap: u32,
    pub spin_cooldown_days: u16,
    pub social_cooldown_days: u16,
    // Empty tables fall back to the built-in defaults.
    pub prizes: Vec<Prize>,
    pub rewards: Vec<RewardItem>,
    pub order_bands: Vec<OrderBand>,
    pub bump: u8,
}

impl LoyaltyConfig {
    pub const SIZE: usize = 32
        + 32
        + 8
        + 8
        + 8
        + 4
        + 2
        + 2
        + 4
        + MAX_PRIZES * Prize::SIZE
        + 4
        + MAX_REWARDS * RewardItem::SIZE
        + 4
        + MAX_ORDER_BANDS * OrderBand::SIZE
        + 1;
}

/// User profile. Created on first touch, never deleted.
#[account]
#[derive(Debug, Default)]
pub struct UserAccount {
    pub user_id: String,
    /// Inviter's user id; a lookup key, not an ownership link.
    pub referral_parent: Option<String>,
    pub first_name: String,
    pub username: String,
    pub created_at: i64,
    pub bump: u8,
}

impl UserAccount {
    pub const SIZE: usize = string_size(MAX_USER_ID_LEN)
        + 1
        + string_size(MAX_USER_ID_LEN)
        + string_size(MAX_PROFILE_FIELD_LEN)
        + string_size(MAX_PROFILE_FIELD_LEN)
        + 8
        + 1;
}

/// Per-user balance. Only ledger operations mutate it.
#[account]
#[derive(Debug, Default)]
pub struct Balance {
    pub user_id: String,
    pub petals: u64,
    pub spin_credits: u8,
    pub last_spin_at: Option<i64>,
    /// Timestamp of the latest SOCIAL_ACTIVITY entry, written together with it.
    pub last_social_at: Option<i64>,
    /// Sequence number the next ledger entry will take.
    pub entry_count: u64,
    pub bump: u8,
}

impl Balance {
    pub const SIZE: usize = string_size(MAX_USER_ID_LEN) + 8 + 1 + 9 + 9 + 8 + 1;
}

/// Immutable ledger entry. Created once, never updated or closed.
#[account]
#[derive(Debug, Default)]
pub struct LedgerEntry {
    pub user_id: String,
    pub seq: u64,
    pub delta: i64,
    pub kind: EntryKind,
    pub memo: String,
    pub created_at: i64,
}

impl LedgerEntry {
    pub const SIZE: usize =
        string_size(MAX_USER_ID_LEN) + 8 + 8 + 1 + string_size(MAX_MEMO_LEN) + 8;
}

/// Redemption code, keyed by the code string.
#[account]
#[derive(Debug, Default)]
pub struct RedemptionCode {
    pub code: String,
    pub code_type: CodeType,
    pub petals_delta: i64,
    pub spin_credit: u8,
    pub expires_at: i64,
    pub single_use: bool,
    /// Pre-bound at issue time, or fixed at first activation.
    pub bound_user_id: Option<String>,
    pub is_used: bool,
    pub used_at: Option<i64>,
    pub checksum: String,
    pub issued_by: Pubkey,
    pub created_at: i64,
    pub bump: u8,
}

impl RedemptionCode {
    pub const SIZE: usize = string_size(MAX_CODE_LEN)
        + 1
        + 8
        + 1
        + 8
        + 1
        + 1
        + string_size(MAX_USER_ID_LEN)
        + 1
        + 9
        + string_size(2)
        + 32
        + 8
        + 1;
}

/// Referral row, keyed by invitee: a user can be referred only once.
#[account]
#[derive(Debug, Default)]
pub struct Referral {
    pub inviter_id: String,
    pub invitee_id: String,
    pub first_order_confirmed_at: Option<i64>,
    pub first_order_amount: Option<u64>,
    pub bonus_paid: bool,
    pub created_at: i64,
    pub bump: u8,
}

impl Referral {
    pub const SIZE: usize =
        string_size(MAX_USER_ID_LEN) + string_size(MAX_USER_ID_LEN) + 9 + 9 + 1 + 8 + 1;
}

/// Per-inviter aggregate backing stats and the yearly cap.
#[account]
#[derive(Debug, Default)]
pub struct ReferrerStats {
    pub inviter_id: String,
    pub total: u64,
    /// Referrals whose bonus has been paid.
    pub successful: u64,
    /// Calendar year `paid_in_year` refers to.
    pub year: i32,
    pub paid_in_year: u32,
    pub bump: u8,
}

impl ReferrerStats {
    pub const SIZE: usize = string_size(MAX_USER_ID_LEN) + 8 + 8 + 4 + 4 + 1;
}
