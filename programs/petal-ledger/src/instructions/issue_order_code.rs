use anchor_lang::prelude::*;

use crate::code_generator;
use crate::constants::*;
use crate::economy;
use crate::errors::*;
use crate::events::CodeIssued;
use crate::instructions::issue_code::expiry;
use crate::redemption::CodeTerms;
use crate::states::*;
use crate::utils::*;

/// Issue an ORDER code whose payout comes from the order-amount bands.
pub fn issue_order_code(
    ctx: Context<IssueOrderCode>,
    code: String,
    order_amount: u64,
    expires_in_days: u16,
) -> Result<()> {
    require!(
        code_generator::is_canonical(&code)
            && code_generator::validate_for(&code, CodeType::Order),
        LoyaltyError::InvalidCode
    );
    let band = economy::order_reward(&ctx.accounts.config.order_bands(), order_amount)?;
    let petals_delta = i64::try_from(band.petals).map_err(|_| LoyaltyError::Overflow)?;

    let now = now()?;
    let terms = CodeTerms {
        code_type: CodeType::Order,
        petals_delta,
        spin_credit: band.spins,
        expires_at: expiry(now, CodeType::Order, expires_in_days),
        bound_user_id: None,
    };
    let issuer = ctx.accounts.operator.key();
    let record = &mut ctx.accounts.code_account;
    record.issue(&code, terms, issuer, now, ctx.bumps.code_account)?;

    msg!(
        "Issued order code {} for amount {}: +{} petals, {} spins",
        record.code,
        order_amount,
        band.petals,
        band.spins
    );
    emit!(CodeIssued {
        code: record.code.clone(),
        code_type: CodeType::Order.as_str().to_string(),
        petals_delta: record.petals_delta,
        spin_credit: record.spin_credit,
        expires_at: record.expires_at,
        bound_user_id: None,
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(code: String)]
pub struct IssueOrderCode<'info> {
    #[account(
        seeds = [CONFIG_SEED],
        bump = config.bump,
        has_one = operator @ LoyaltyError::NotOperator
    )]
    pub config: Box<Account<'info, LoyaltyConfig>>,

    #[account(
        init,
        payer = operator,
        space = 8 + RedemptionCode::SIZE,
        seeds = [CODE_SEED, code.as_bytes()],
        bump
    )]
    pub code_account: Account<'info, RedemptionCode>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}
