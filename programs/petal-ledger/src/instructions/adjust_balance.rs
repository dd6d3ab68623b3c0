use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::*;
use crate::receipts::{triage, AdjustmentReceipt};
use crate::states::*;
use crate::utils::*;

/// Manual correction by the operator, logged as `ADMIN_ADJUSTMENT`.
pub fn adjust_balance(
    mut ctx: Context<AdjustBalance>,
    user_id: String,
    delta: i64,
    note: String,
) -> Result<AdjustmentReceipt> {
    require!(delta != 0, LoyaltyError::InvalidAmount);
    let now = now()?;
    let accounts = &mut ctx.accounts;

    touch_user(
        &mut accounts.user,
        ctx.bumps.user,
        &mut accounts.balance,
        ctx.bumps.balance,
        &user_id,
        now,
    )?;

    let memo = format!("note={};operator={}", note, accounts.operator.key());
    let posting = match triage(accounts.balance.apply_delta(delta, EntryKind::AdminAdjustment, memo))? {
        Ok(posting) => posting,
        Err(rejection) => {
            msg!("Adjustment of {} by {:+} rejected", user_id, delta);
            return Ok(AdjustmentReceipt {
                success: false,
                message: rejection.message.clone(),
                petals: accounts.balance.petals,
                rejection: Some(rejection),
            });
        }
    };
    post_entry(
        &mut accounts.balance,
        &accounts.entry.to_account_info(),
        &accounts.operator,
        &accounts.system_program,
        posting,
        now,
    )?;

    msg!("Adjusted {} by {:+}", user_id, delta);
    Ok(AdjustmentReceipt {
        success: true,
        message: format!("Balance adjusted by {:+}", delta),
        petals: accounts.balance.petals,
        rejection: None,
    })
}

#[derive(Accounts)]
#[instruction(user_id: String)]
pub struct AdjustBalance<'info> {
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

    /// CHECK: PDA `["entry", user_id, balance.entry_count]`, created on success.
    #[account(mut)]
    pub entry: UncheckedAccount<'info>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}
