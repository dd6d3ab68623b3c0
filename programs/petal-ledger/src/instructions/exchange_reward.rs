use anchor_lang::prelude::*;

use crate::code_generator;
use crate::constants::*;
use crate::economy;
use crate::errors::*;
use crate::events::{CodeIssued, RewardExchanged};
use crate::instructions::issue_code::expiry;
use crate::receipts::{triage, ExchangeReceipt};
use crate::redemption::CodeTerms;
use crate::states::*;
use crate::utils::*;

/// Spend petals on a catalogue reward.
///
/// Debits the cost and mints a REWARD code bound to the user in the same
/// transaction. The code is derived from the user's entry count, so clients
/// compute it (and its address) with `economy::reward_code_entropy` first.
pub fn exchange_reward(
    mut ctx: Context<ExchangeReward>,
    user_id: String,
    reward_id: String,
    code: String,
) -> Result<ExchangeReceipt> {
    let now = now()?;
    let catalogue = ctx.accounts.config.reward_catalogue();
    let accounts = &mut ctx.accounts;

    touch_user(
        &mut accounts.user,
        ctx.bumps.user,
        &mut accounts.balance,
        ctx.bumps.balance,
        &user_id,
        now,
    )?;

    let entropy = economy::reward_code_entropy(&user_id, accounts.balance.entry_count);
    let expected = code_generator::generate_for(CodeType::Reward, &entropy);
    require!(expected.code == code, LoyaltyError::UnexpectedAccountAddress);

    let outcome = economy::find_reward(&catalogue, &reward_id)
        .and_then(|item| economy::exchange(&mut accounts.balance, item).map(|p| (item.clone(), p)));
    let (item, posting) = match triage(outcome)? {
        Ok(done) => done,
        Err(rejection) => {
            msg!("Exchange of {} by {} rejected", reward_id, user_id);
            return Ok(ExchangeReceipt::rejected(rejection, &accounts.balance));
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

    let code_info = accounts.reward_code.to_account_info();
    let bump = create_pda_account(
        &accounts.operator,
        &code_info,
        &accounts.system_program,
        &[CODE_SEED, code.as_bytes()],
        8 + RedemptionCode::SIZE,
    )?;
    let mut record = RedemptionCode::default();
    record.issue(
        &code,
        CodeTerms {
            code_type: CodeType::Reward,
            petals_delta: 0,
            spin_credit: 0,
            expires_at: expiry(now, CodeType::Reward, REWARD_CODE_TTL_DAYS),
            bound_user_id: Some(user_id.clone()),
        },
        accounts.operator.key(),
        now,
        bump,
    )?;
    write_account(&code_info, &record)?;

    msg!("User {} exchanged {} petals for {}", user_id, item.petals_cost, item.id);
    emit!(CodeIssued {
        code: record.code.clone(),
        code_type: CodeType::Reward.as_str().to_string(),
        petals_delta: 0,
        spin_credit: 0,
        expires_at: record.expires_at,
        bound_user_id: record.bound_user_id.clone(),
    });
    emit!(RewardExchanged {
        user_id: user_id.clone(),
        reward_id: item.id.clone(),
        petals_cost: item.petals_cost,
        code: record.code.clone(),
        expires_at: record.expires_at,
    });

    Ok(ExchangeReceipt {
        success: true,
        message: format!("Reward \"{}\" exchanged, promo code created", item.name),
        code: Some(record.code),
        expires_at: Some(record.expires_at),
        petals: accounts.balance.petals,
        spin_credits: accounts.balance.spin_credits,
        rejection: None,
    })
}

#[derive(Accounts)]
#[instruction(user_id: String)]
pub struct ExchangeReward<'info> {
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

    /// CHECK: PDA `["code", code]` of the minted reward code, created on success.
    #[account(mut)]
    pub reward_code: UncheckedAccount<'info>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}
