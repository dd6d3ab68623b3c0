use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::*;
use crate::events::ReferralBonusPaid;
use crate::receipts::{triage, PayoutReceipt};
use crate::referral::{self, ReferralTerms};
use crate::states::*;
use crate::utils::*;

fn load_required<T: AccountDeserialize>(info: &AccountInfo) -> Result<T> {
    read_account::<T>(info)?.ok_or_else(|| anchor_lang::error::ErrorCode::AccountNotInitialized.into())
}

/// Confirm the invitee's first order and pay both referral bonuses.
///
/// Below-minimum orders and invitees without a pending referral are
/// rejected in the receipt. Otherwise the row, both balances, both ledger
/// entries and the inviter's yearly counter are written together.
pub fn confirm_first_order(
    ctx: Context<ConfirmFirstOrder>,
    invitee_id: String,
    inviter_id: String,
    order_amount: u64,
) -> Result<PayoutReceipt> {
    validate_user_id(&invitee_id)?;
    validate_user_id(&inviter_id)?;
    let now = now()?;
    let terms = ReferralTerms::from(&**ctx.accounts.config);
    let accounts = &ctx.accounts;

    let referral_info = accounts.referral.to_account_info();
    let invitee_info = accounts.invitee_balance.to_account_info();
    let inviter_info = accounts.inviter_balance.to_account_info();
    let stats_info = accounts.referrer_stats.to_account_info();
    expect_pda(&referral_info, &[REFERRAL_SEED, invitee_id.as_bytes()])?;
    expect_pda(&invitee_info, &[BALANCE_SEED, invitee_id.as_bytes()])?;
    expect_pda(&inviter_info, &[BALANCE_SEED, inviter_id.as_bytes()])?;
    expect_pda(&stats_info, &[REFERRER_SEED, inviter_id.as_bytes()])?;

    let mut row = read_account::<Referral>(&referral_info)?;
    let (mut invitee, mut inviter, mut stats) = match &row {
        Some(existing) => {
            require!(existing.inviter_id == inviter_id, LoyaltyError::InviterMismatch);
            (
                load_required::<Balance>(&invitee_info)?,
                load_required::<Balance>(&inviter_info)?,
                load_required::<ReferrerStats>(&stats_info)?,
            )
        }
        // Nothing will be written; the engine rejects below.
        None => Default::default(),
    };

    let outcome = referral::confirm_first_order(
        row.as_mut(),
        &mut invitee,
        &mut inviter,
        &mut stats,
        order_amount,
        now,
        &terms,
    );
    let payout = match triage(outcome)? {
        Ok(payout) => payout,
        Err(rejection) => {
            msg!("First order of {} not paid out", invitee_id);
            return Ok(PayoutReceipt {
                success: false,
                message: rejection.message.clone(),
                invitee_bonus: 0,
                inviter_bonus: 0,
                rejection: Some(rejection),
            });
        }
    };

    if let Some(paid) = row.as_ref() {
        write_account(&referral_info, paid)?;
    }
    post_entry(
        &mut invitee,
        &accounts.invitee_entry.to_account_info(),
        &accounts.operator,
        &accounts.system_program,
        payout.invitee,
        now,
    )?;
    post_entry(
        &mut inviter,
        &accounts.inviter_entry.to_account_info(),
        &accounts.operator,
        &accounts.system_program,
        payout.inviter,
        now,
    )?;
    write_account(&invitee_info, &invitee)?;
    write_account(&inviter_info, &inviter)?;
    write_account(&stats_info, &stats)?;

    msg!(
        "Referral bonus paid: {} +{}, {} +{}",
        invitee_id,
        terms.invitee_bonus,
        inviter_id,
        terms.inviter_bonus
    );
    emit!(ReferralBonusPaid {
        inviter_id,
        invitee_id,
        order_amount,
        invitee_bonus: terms.invitee_bonus,
        inviter_bonus: terms.inviter_bonus,
    });
    Ok(PayoutReceipt {
        success: true,
        message: format!(
            "Referral bonus credited! +{} petals to you, +{} to your inviter",
            terms.invitee_bonus, terms.inviter_bonus
        ),
        invitee_bonus: terms.invitee_bonus,
        inviter_bonus: terms.inviter_bonus,
        rejection: None,
    })
}

#[derive(Accounts)]
pub struct ConfirmFirstOrder<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
        has_one = operator @ LoyaltyError::NotOperator
    )]
    pub config: Box<Account<'info, LoyaltyConfig>>,

    /// CHECK: PDA `["referral", invitee_id]`, verified in the handler. May
    /// not exist, which is reported as "no pending referral".
    #[account(mut)]
    pub referral: UncheckedAccount<'info>,

    /// CHECK: PDA `["balance", invitee_id]`, verified in the handler.
    #[account(mut)]
    pub invitee_balance: UncheckedAccount<'info>,

    /// CHECK: PDA `["balance", inviter_id]`, verified in the handler.
    #[account(mut)]
    pub inviter_balance: UncheckedAccount<'info>,

    /// CHECK: PDA `["referrer", inviter_id]`, verified in the handler.
    #[account(mut)]
    pub referrer_stats: UncheckedAccount<'info>,

    /// CHECK: next entry PDA of the invitee, created on payout.
    #[account(mut)]
    pub invitee_entry: UncheckedAccount<'info>,

    /// CHECK: next entry PDA of the inviter, created on payout.
    #[account(mut)]
    pub inviter_entry: UncheckedAccount<'info>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}
