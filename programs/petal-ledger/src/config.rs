use anchor_lang::prelude::*;

use crate::constants::*;
use crate::cooldown::CooldownPolicy;
use crate::economy;
use crate::errors::LoyaltyError;
use crate::states::{LoyaltyConfig, OrderBand, Prize, RewardItem};
use crate::wheel;

/// Full replacement snapshot of the loyalty configuration.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct ConfigParams {
    pub operator: Pubkey,
    pub referral_min_order: u64,
    pub invitee_bonus: u64,
    pub inviter_bonus: u64,
    pub referral_yearly_cap: u32,
    pub spin_cooldown_days: u16,
    pub social_cooldown_days: u16,
    /// Empty means the built-in wheel.
    pub prizes: Vec<Prize>,
    /// Empty means the built-in catalogue.
    pub rewards: Vec<RewardItem>,
    /// Empty means the built-in bands.
    pub order_bands: Vec<OrderBand>,
}

impl ConfigParams {
    /// Defaults for everything but the operator key.
    pub fn with_operator(operator: Pubkey) -> Self {
        Self {
            operator,
            referral_min_order: DEFAULT_REFERRAL_MIN_ORDER,
            invitee_bonus: DEFAULT_INVITEE_BONUS,
            inviter_bonus: DEFAULT_INVITER_BONUS,
            referral_yearly_cap: DEFAULT_REFERRAL_YEARLY_CAP,
            spin_cooldown_days: DEFAULT_SPIN_COOLDOWN_DAYS,
            social_cooldown_days: DEFAULT_SOCIAL_COOLDOWN_DAYS,
            prizes: Vec::new(),
            rewards: Vec::new(),
            order_bands: Vec::new(),
        }
    }

    pub fn validate(&self) -> core::result::Result<(), LoyaltyError> {
        let nonzero = self.referral_min_order > 0
            && self.invitee_bonus > 0
            && self.inviter_bonus > 0
            && self.referral_yearly_cap > 0
            && self.spin_cooldown_days > 0
            && self.social_cooldown_days > 0;
        if !nonzero {
            return Err(LoyaltyError::InvalidConfig);
        }
        if self.prizes.len() > MAX_PRIZES
            || self.rewards.len() > MAX_REWARDS
            || self.order_bands.len() > MAX_ORDER_BANDS
        {
            return Err(LoyaltyError::InvalidConfig);
        }
        self.prizes.iter().try_for_each(validate_prize)?;
        self.rewards.iter().try_for_each(validate_reward)?;
        validate_bands(&self.order_bands)
    }
}

fn validate_prize(prize: &Prize) -> core::result::Result<(), LoyaltyError> {
    let fits = !prize.id.is_empty()
        && prize.id.len() <= MAX_PRIZE_ID_LEN
        && prize.label.len() <= MAX_PRIZE_LABEL_LEN
        && prize.color.len() <= MAX_COLOR_LEN;
    // NaN fails both comparisons
    let weighted = prize.probability >= 0.0 && prize.probability <= 1.0;
    if !fits || !weighted {
        return Err(LoyaltyError::InvalidConfig);
    }
    Ok(())
}

fn validate_reward(item: &RewardItem) -> core::result::Result<(), LoyaltyError> {
    if item.id.is_empty()
        || item.id.len() > MAX_REWARD_ID_LEN
        || item.name.len() > MAX_REWARD_NAME_LEN
        || item.petals_cost == 0
    {
        return Err(LoyaltyError::InvalidConfig);
    }
    Ok(())
}

/// Bands must be non-empty ranges, sorted and non-overlapping.
fn validate_bands(bands: &[OrderBand]) -> core::result::Result<(), LoyaltyError> {
    let mut previous_max: Option<u64> = None;
    for band in bands {
        if band.min_amount > band.max_amount || band.spins > MAX_SPIN_CREDITS {
            return Err(LoyaltyError::InvalidConfig);
        }
        if matches!(previous_max, Some(max) if band.min_amount <= max) {
            return Err(LoyaltyError::InvalidConfig);
        }
        previous_max = Some(band.max_amount);
    }
    Ok(())
}

impl LoyaltyConfig {
    /// Replaces the whole snapshot. `params` must already be validated.
    pub fn apply(&mut self, admin: Pubkey, params: ConfigParams, bump: u8) {
        self.admin = admin;
        self.operator = params.operator;
        self.referral_min_order = params.referral_min_order;
        self.invitee_bonus = params.invitee_bonus;
        self.inviter_bonus = params.inviter_bonus;
        self.referral_yearly_cap = params.referral_yearly_cap;
        self.spin_cooldown_days = params.spin_cooldown_days;
        self.social_cooldown_days = params.social_cooldown_days;
        self.prizes = params.prizes;
        self.rewards = params.rewards;
        self.order_bands = params.order_bands;
        self.bump = bump;
    }

    pub fn policy(&self) -> CooldownPolicy {
        CooldownPolicy::from(self)
    }

    pub fn wheel_prizes(&self) -> Vec<Prize> {
        wheel::configuration(&self.prizes)
    }

    pub fn reward_catalogue(&self) -> Vec<RewardItem> {
        economy::reward_catalogue(&self.rewards)
    }

    pub fn order_bands(&self) -> Vec<OrderBand> {
        economy::order_bands(&self.order_bands)
    }
}
