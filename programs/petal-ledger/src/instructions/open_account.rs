use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::*;
use crate::ledger::Profile;
use crate::states::*;
use crate::utils::*;

/// Get-or-create a user with a zeroed balance, refreshing display fields.
///
/// Idempotent: an existing user keeps its balance and creation time.
pub fn open_account(ctx: Context<OpenAccount>, user_id: String, profile: Profile) -> Result<()> {
    let now = now()?;
    let user = &mut ctx.accounts.user;
    let balance = &mut ctx.accounts.balance;

    touch_user(user, ctx.bumps.user, balance, ctx.bumps.balance, &user_id, now)?;
    user.update_profile(&profile)?;
    Ok(())
}

#[derive(Accounts)]
#[instruction(user_id: String)]
pub struct OpenAccount<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
        has_one = operator @ LoyaltyError::NotOperator
    )]
    pub config: Box<Account<'info, LoyaltyConfig>>,

    #[account(
        init_if_needed,
        payer = operator,
        space = 8 + UserAccount::SIZE,
        seeds = [USER_SEED, user_id.as_bytes()],
        bump
    )]
    pub user: Account<'info, UserAccount>,

    #[account(
        init_if_needed,
        payer = operator,
        space = 8 + Balance::SIZE,
        seeds = [BALANCE_SEED, user_id.as_bytes()],
        bump
    )]
    pub balance: Account<'info, Balance>,

    /// Trusted gateway that resolved the user's identity.
    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}
