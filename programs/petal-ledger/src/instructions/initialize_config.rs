use anchor_lang::prelude::*;

use crate::config::ConfigParams;
use crate::constants::*;
use crate::events::ConfigUpdated;
use crate::states::*;

/// Create the loyalty configuration.
///
/// Called once by the admin after deploy. Empty tables in `params` select
/// the built-in wheel, catalogue and order bands.
pub fn initialize_config(ctx: Context<InitializeConfig>, params: ConfigParams) -> Result<()> {
    params.validate()?;

    let config = &mut ctx.accounts.config;
    config.apply(ctx.accounts.admin.key(), params, ctx.bumps.config);

    msg!("Config initialized, operator {}", config.operator);
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
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + LoyaltyConfig::SIZE,
        seeds = [CONFIG_SEED],
        bump
    )]
    pub config: Box<Account<'info, LoyaltyConfig>>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}
