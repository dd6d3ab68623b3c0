use anchor_lang::prelude::*;

use crate::config::ConfigParams;
use crate::constants::*;
use crate::errors::*;
use crate::events::ConfigUpdated;
use crate::states::*;

/// Replace the configuration snapshot wholesale.
///
/// Calls already in flight keep the snapshot they loaded; the next call
/// sees the new one.
pub fn update_config(ctx: Context<UpdateConfig>, params: ConfigParams) -> Result<()> {
    params.validate()?;

    let config = &mut ctx.accounts.config;
    let bump = config.bump;
    config.apply(ctx.accounts.admin.key(), params, bump);

    msg!("Config replaced by {}", config.admin);
    emit!(ConfigUpdated {
        admin: config.admin,
        operator: config.operator,
        prizes: config.prizes.len() as u8,
        rewards: config.rewards.len() as u8,
        order_bands: config.order_bands.len() as u8,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    #[account(
        mut,
        seeds = [CONFIG_SEED],
        bump = config.bump,
        has_one = admin @ LoyaltyError::NotAdmin
    )]
    pub config: Box<Account<'info, LoyaltyConfig>>,

    pub admin: Signer<'info>,
}
