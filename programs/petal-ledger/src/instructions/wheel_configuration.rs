use anchor_lang::prelude::*;

use crate::constants::*;
use crate::states::*;
use crate::utils::*;
use crate::wheel;

/// Active prize table. Falls back to the built-in wheel when the config is
/// absent or carries no prizes.
pub fn wheel_configuration(ctx: Context<WheelConfiguration>) -> Result<Vec<Prize>> {
    let config_info = ctx.accounts.config.to_account_info();
    expect_pda(&config_info, &[CONFIG_SEED])?;
    let prizes = match read_account::<LoyaltyConfig>(&config_info)? {
        Some(config) => config.wheel_prizes(),
        None => wheel::default_prizes(),
    };
    Ok(prizes)
}

#[derive(Accounts)]
pub struct WheelConfiguration<'info> {
    /// CHECK: PDA `["config"]`, verified in the handler; may not exist yet.
    pub config: UncheckedAccount<'info>,
}
