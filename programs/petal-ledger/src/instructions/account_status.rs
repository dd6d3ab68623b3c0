use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::*;
use crate::receipts::AccountStatus;
use crate::states::*;
use crate::utils::*;

/// Read-only snapshot of a balance and its cooldowns. A user never seen
/// before reads as zero with every window open.
pub fn account_status(ctx: Context<AccountStatusQuery>, user_id: String) -> Result<AccountStatus> {
    validate_user_id(&user_id)?;
    let now = now()?;
    let policy = ctx.accounts.config.policy();

    let balance_info = ctx.accounts.balance.to_account_info();
    expect_pda(&balance_info, &[BALANCE_SEED, user_id.as_bytes()])?;
    let balance = read_account::<Balance>(&balance_info)?.unwrap_or_default();
    Ok(balance.status(&user_id, now, &policy))
}

#[derive(Accounts)]
pub struct AccountStatusQuery<'info> {
    #[account(seeds = [CONFIG_SEED], bump = config.bump)]
    pub config: Box<Account<'info, LoyaltyConfig>>,

    /// CHECK: PDA `["balance", user_id]`, verified in the handler.
    pub balance: UncheckedAccount<'info>,
}
