use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::*;
use crate::events::ReferralRegistered;
use crate::receipts::{triage, ReferralReceipt};
use crate::referral::{self, Registration};
use crate::states::*;
use crate::utils::*;

/// Register `inviter_id` as the inviter of `invitee_id`.
///
/// The first inviter wins; later calls for the same invitee succeed without
/// effect. Self-referrals and inviters at their yearly cap are rejected in
/// the receipt. Inviter-side accounts are only created together with the
/// referral row.
pub fn process_referral(
    mut ctx: Context<ProcessReferral>,
    invitee_id: String,
    inviter_id: String,
) -> Result<ReferralReceipt> {
    validate_user_id(&inviter_id)?;
    let now = now()?;
    let policy = ctx.accounts.config.policy();
    let accounts = &mut ctx.accounts;

    touch_user(
        &mut accounts.invitee_user,
        ctx.bumps.invitee_user,
        &mut accounts.invitee_balance,
        ctx.bumps.invitee_balance,
        &invitee_id,
        now,
    )?;

    let referral_info = accounts.referral.to_account_info();
    expect_pda(&referral_info, &[REFERRAL_SEED, invitee_id.as_bytes()])?;
    let stats_info = accounts.referrer_stats.to_account_info();
    expect_pda(&stats_info, &[REFERRER_SEED, inviter_id.as_bytes()])?;
    let mut stats = read_account::<ReferrerStats>(&stats_info)?.unwrap_or_default();

    let decision = referral::evaluate_registration(
        &invitee_id,
        &inviter_id,
        account_exists(&referral_info),
        &stats,
        now,
        &policy,
    );
    match triage(decision)? {
        Ok(Registration::Create) => {}
        Ok(Registration::AlreadyReferred) => {
            msg!("User {} already has an inviter", invitee_id);
            return Ok(ReferralReceipt {
                success: true,
                created: false,
                message: "Referral already recorded".to_string(),
                rejection: None,
            });
        }
        Err(rejection) => {
            msg!("Referral {} -> {} rejected", inviter_id, invitee_id);
            return Ok(ReferralReceipt {
                success: false,
                created: false,
                message: rejection.message.clone(),
                rejection: Some(rejection),
            });
        }
    }

    ensure_user(
        &accounts.inviter_user.to_account_info(),
        &accounts.inviter_balance.to_account_info(),
        &accounts.operator,
        &accounts.system_program,
        &inviter_id,
        now,
    )?;

    let bump = create_pda_account(
        &accounts.operator,
        &referral_info,
        &accounts.system_program,
        &[REFERRAL_SEED, invitee_id.as_bytes()],
        8 + Referral::SIZE,
    )?;
    let mut row = Referral::default();
    row.open(&inviter_id, &invitee_id, now, bump);
    write_account(&referral_info, &row)?;

    if !account_exists(&stats_info) {
        let bump = create_pda_account(
            &accounts.operator,
            &stats_info,
            &accounts.system_program,
            &[REFERRER_SEED, inviter_id.as_bytes()],
            8 + ReferrerStats::SIZE,
        )?;
        stats.open(&inviter_id, bump);
    }
    stats.record_referral()?;
    write_account(&stats_info, &stats)?;

    accounts.invitee_user.set_referral_parent(&inviter_id);

    msg!("Referral registered: {} invited {}", inviter_id, invitee_id);
    emit!(ReferralRegistered {
        inviter_id,
        invitee_id,
    });
    Ok(ReferralReceipt {
        success: true,
        created: true,
        message: "Referral registered".to_string(),
        rejection: None,
    })
}

#[derive(Accounts)]
#[instruction(invitee_id: String)]
pub struct ProcessReferral<'info> {
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
        seeds = [USER_SEED, invitee_id.as_bytes()],
        bump
    )]
    pub invitee_user: Account<'info, UserAccount>,

    #[account(
        init_if_needed,
        payer = operator,
        space = 8 + Balance::SIZE,
        seeds = [BALANCE_SEED, invitee_id.as_bytes()],
        bump
    )]
    pub invitee_balance: Account<'info, Balance>,

    /// CHECK: PDA `["user", inviter_id]`, created by the handler if missing.
    #[account(mut)]
    pub inviter_user: UncheckedAccount<'info>,

    /// CHECK: PDA `["balance", inviter_id]`, created by the handler if missing.
    #[account(mut)]
    pub inviter_balance: UncheckedAccount<'info>,

    /// CHECK: PDA `["referral", invitee_id]`; its existence is the
    /// exactly-once guard.
    #[account(mut)]
    pub referral: UncheckedAccount<'info>,

    /// CHECK: PDA `["referrer", inviter_id]`, read or created by the handler.
    #[account(mut)]
    pub referrer_stats: UncheckedAccount<'info>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}
