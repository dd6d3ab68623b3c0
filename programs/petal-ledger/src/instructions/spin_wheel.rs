use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::slot_hashes;

use crate::constants::*;
use crate::errors::*;
use crate::events::WheelSpun;
use crate::receipts::{triage, SpinReceipt, SPIN_DURATION_MS};
use crate::states::*;
use crate::utils::*;
use crate::wheel;

/// Spend a spin credit on the prize wheel.
///
/// The draw mixes the newest slot hash with the caller's nonce and the
/// user's entry count. `NoCredit` and `CooldownActive` come back in the
/// receipt.
pub fn spin_wheel(mut ctx: Context<SpinWheel>, user_id: String, nonce: u64) -> Result<SpinReceipt> {
    let now = now()?;
    let policy = ctx.accounts.config.policy();
    let prizes = ctx.accounts.config.wheel_prizes();
    let accounts = &mut ctx.accounts;

    touch_user(
        &mut accounts.user,
        ctx.bumps.user,
        &mut accounts.balance,
        ctx.bumps.balance,
        &user_id,
        now,
    )?;

    let slot_hash = recent_slot_hash(&accounts.slot_hashes.to_account_info())?;
    let seed = wheel::draw_seed(&slot_hash, &user_id, nonce, accounts.balance.entry_count);

    let outcome = match triage(wheel::spin(&mut accounts.balance, &prizes, &seed, now, &policy))? {
        Ok(outcome) => outcome,
        Err(rejection) => {
            msg!("Spin by {} rejected", user_id);
            return Ok(SpinReceipt::rejected(rejection, &accounts.balance));
        }
    };

    post_entry(
        &mut accounts.balance,
        &accounts.entry.to_account_info(),
        &accounts.operator,
        &accounts.system_program,
        outcome.posting.clone(),
        now,
    )?;

    msg!("User {} won {}", user_id, outcome.prize.id);
    emit!(WheelSpun {
        user_id: user_id.clone(),
        prize_id: outcome.prize.id.clone(),
        prize_type: outcome.prize.kind.as_str().to_string(),
        prize_value: outcome.prize.value,
        angle: outcome.angle,
    });

    Ok(SpinReceipt {
        success: true,
        message: wheel::prize_message(&outcome.prize),
        prize: Some(outcome.prize),
        angle: outcome.angle,
        duration_ms: SPIN_DURATION_MS,
        petals: accounts.balance.petals,
        spin_credits: accounts.balance.spin_credits,
        rejection: None,
    })
}

#[derive(Accounts)]
#[instruction(user_id: String)]
pub struct SpinWheel<'info> {
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

    /// CHECK: address pinned to the sysvar.
    #[account(address = slot_hashes::ID)]
    pub slot_hashes: UncheckedAccount<'info>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}
