use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::*;
use crate::receipts::ReferralStatsView;
use crate::states::*;
use crate::utils::*;

/// Referral counters of `inviter_id` for the current calendar year.
pub fn referral_stats(ctx: Context<ReferralStats>, inviter_id: String) -> Result<ReferralStatsView> {
    validate_user_id(&inviter_id)?;
    let now = now()?;
    let config = &ctx.accounts.config;

    let stats_info = ctx.accounts.referrer_stats.to_account_info();
    expect_pda(&stats_info, &[REFERRER_SEED, inviter_id.as_bytes()])?;
    let stats = read_account::<ReferrerStats>(&stats_info)?.unwrap_or_default();
    Ok(stats.view(now, &config.policy(), config.inviter_bonus))
}

#[derive(Accounts)]
pub struct ReferralStats<'info> {
    #[account(seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Box<Account<'info, LoyaltyConfig>>,

    /// CHECK: PDA `["referrer", inviter_id]`, verified in the handler; absent
    /// until the inviter's first referral.
    pub referrer_stats: UncheckedAccount<'info>,
}
