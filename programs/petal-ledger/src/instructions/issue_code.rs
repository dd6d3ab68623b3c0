use anchor_lang::prelude::*;

use crate::code_generator;
use crate::constants::*;
use crate::errors::*;
use crate::events::CodeIssued;
use crate::redemption::CodeTerms;
use crate::states::*;
use crate::utils::*;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct IssueCodeArgs {
    /// Full code including its checksum, e.g. from `code_generator::generate_for`.
    pub code: String,
    pub code_type: CodeType,
    pub petals_delta: i64,
    pub spin_credit: u8,
    /// 0 selects the default lifetime for the code type.
    pub expires_in_days: u16,
    pub bound_user_id: Option<String>,
}

pub fn default_ttl_days(code_type: CodeType) -> u16 {
    match code_type {
        CodeType::Reward => REWARD_CODE_TTL_DAYS,
        CodeType::Order | CodeType::Social => DEFAULT_CODE_TTL_DAYS,
    }
}

pub fn expiry(now: i64, code_type: CodeType, expires_in_days: u16) -> i64 {
    let days = if expires_in_days == 0 {
        default_ttl_days(code_type)
    } else {
        expires_in_days
    };
    now.saturating_add(i64::from(days) * SECONDS_PER_DAY)
}

/// Staff issues a redemption code.
///
/// The code string is generated off-chain; here it must carry a valid
/// checksum and the prefix of its type. Issuing the same code twice fails
/// because its account already exists.
pub fn issue_code(ctx: Context<IssueCode>, args: IssueCodeArgs) -> Result<()> {
    require!(
        code_generator::is_canonical(&args.code)
            && code_generator::validate_for(&args.code, args.code_type),
        LoyaltyError::InvalidCode
    );
    let now = now()?;
    let terms = CodeTerms {
        code_type: args.code_type,
        petals_delta: args.petals_delta,
        spin_credit: args.spin_credit,
        expires_at: expiry(now, args.code_type, args.expires_in_days),
        bound_user_id: args.bound_user_id,
    };

    let issuer = ctx.accounts.operator.key();
    let record = &mut ctx.accounts.code_account;
    record.issue(&args.code, terms, issuer, now, ctx.bumps.code_account)?;

    msg!("Issued {} code {}", record.code_type.as_str(), record.code);
    emit!(CodeIssued {
        code: record.code.clone(),
        code_type: record.code_type.as_str().to_string(),
        petals_delta: record.petals_delta,
        spin_credit: record.spin_credit,
        expires_at: record.expires_at,
        bound_user_id: record.bound_user_id.clone(),
    });
    Ok(())
}

#[derive(Accounts)]
#[instruction(args: IssueCodeArgs)]
pub struct IssueCode<'info> {
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
        seeds = [CODE_SEED, args.code.as_bytes()],
        bump
    )]
    pub code_account: Account<'info, RedemptionCode>,

    #[account(mut)]
    pub operator: Signer<'info>,

    pub system_program: Program<'info, System>,
}
