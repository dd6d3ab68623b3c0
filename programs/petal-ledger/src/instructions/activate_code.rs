use anchor_lang::prelude::*;

use crate::code_generator;
use crate::constants::*;
use crate::errors::*;
use crate::events::CodeActivated;
use crate::receipts::{triage, ActivationReceipt};
use crate::redemption;
use crate::states::*;
use crate::utils::*;

/// Activate a redemption code for a user.
///
/// Checks, in order: checksum, existence, expiry, prior use, owner binding
/// and (for SOCIAL codes) the social cooldown. Rejections come back in the
/// receipt with nothing changed; on success the petal entry, spin credit and
/// the code's used flag are written together.
pub fn activate_code(
    mut ctx: Context<ActivateCode>,
    code: String,
    user_id: String,
) -> Result<ActivationReceipt> {
    let now = now()?;
    let policy = ctx.accounts.config.policy();
    let accounts = &mut ctx.accounts;

    touch_user(
        &mut accounts.user,
        ctx.bumps.user,
        &mut accounts.balance,
        ctx.bumps.balance,
        &user_id,
        now,
    )?;

    // Codes are stored uppercase; any casing the user typed addresses the same account.
    let code = code_generator::normalize(&code);
    // Longer strings can never have been issued, nor used as a seed.
    if code.len() > MAX_CODE_LEN {
        return Ok(ActivationReceipt::rejected(
            LoyaltyError::InvalidCode.into(),
            &accounts.balance,
        ));
    }
    let code_info = accounts.code_account.to_account_info();
    expect_pda(&code_info, &[CODE_SEED, code.as_bytes()])?;
    let mut stored = read_account::<RedemptionCode>(&code_info)?;

    let outcome = redemption::activate(
        &code,
        stored.as_mut(),
        &mut accounts.balance,
        &user_id,
        now,
        &policy,
    );
    let activation = match triage(outcome)? {
        Ok(activation) => activation,
        Err(rejection) => {
            msg!("Activation of {} by {} rejected", code, user_id);
            return Ok(ActivationReceipt::rejected(rejection, &accounts.balance));
        }
    };

    if let Some(record) = stored.as_ref() {
        write_account(&code_info, record)?;
    }
    post_entry(
        &mut accounts.balance,
        &accounts.entry.to_account_info(),
        &accounts.operator,
        &accounts.system_program,
        activation.posting.clone(),
        now,
    )?;

    msg!(
        "Code {} activated by {}: {:+} petals, {} spin credits",
        code,
        user_id,
        activation.petals_added,
        activation.spin_credits_added
    );
    emit!(CodeActivated {
        code: code.clone(),
        user_id: user_id.clone(),
        petals_added: activation.petals_added,
        spin_credits_added: activation.spin_credits_added,
    });

    Ok(ActivationReceipt {
        success: true,
        message: redemption::activation_message(&activation),
        petals_added: activation.petals_added,
        spin_credits_added: activation.spin_credits_added,
        petals: accounts.balance.petals,
        spin_credits: accounts.balance.spin_credits,
        rejection: None,
    })
}

#[derive(Accounts)]
#[instruction(code: String, user_id: String)]
pub struct ActivateCode<'info> {
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

    /// CHECK: PDA `["code", code]` of the uppercased code, verified in the
    /// handler. May not exist; a missing code is a rejection, not an account
    /// error.
    #[account(mut)]
    pub code_account: UncheckedAccount<'info>,

    /// CHECK: PDA `["entry", user_id, balance.entry_count]`, created by the
    /// handler only when the activation succeeds.
    #[account(mut)]
    pub entry: UncheckedAccount<'info>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}
