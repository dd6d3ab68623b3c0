use anchor_lang::prelude::*;

pub mod checksum;
pub mod code_generator;
pub mod config;
pub mod constants;
pub mod cooldown;
pub mod economy;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod receipts;
pub mod redemption;
pub mod referral;
pub mod states;
pub mod utils;
pub mod wheel;

pub use instructions::*;

use config::ConfigParams;
use ledger::Profile;
use receipts::{
    AccountStatus, ActivationReceipt, AdjustmentReceipt, ExchangeReceipt, PayoutReceipt,
    ReferralReceipt, ReferralStatsView, SpinReceipt,
};
use states::Prize;

declare_id!("G9x2vYdJt5SVrhMJTHxZfTQjhxArANNN37ZWXtcZXCvo");

#[program]
pub mod petal_ledger {
    use super::*;

    /// Create the global configuration.
    ///
    /// Called once by the admin after deploy. `params.operator` becomes the
    /// only key allowed to act on behalf of users. Empty prize, reward or
    /// band tables fall back to the built-in defaults.
    pub fn initialize_config(ctx: Context<InitializeConfig>, params: ConfigParams) -> Result<()> {
        instructions::initialize_config::initialize_config(ctx, params)
    }

    /// Replace the whole configuration snapshot. Admin only.
    pub fn update_config(ctx: Context<UpdateConfig>, params: ConfigParams) -> Result<()> {
        instructions::update_config::update_config(ctx, params)
    }

    /// Get-or-create a user and refresh the profile fields that were sent.
    pub fn open_account(ctx: Context<OpenAccount>, user_id: String, profile: Profile) -> Result<()> {
        instructions::open_account::open_account(ctx, user_id, profile)
    }

    /// Staff issues a checksum-valid promo code.
    ///
    /// The code string is generated off-chain; the program checks its prefix
    /// and checksum and refuses duplicates through the code PDA.
    pub fn issue_code(ctx: Context<IssueCode>, args: IssueCodeArgs) -> Result<()> {
        instructions::issue_code::issue_code(ctx, args)
    }

    /// Issue an ORDER code whose payout comes from the order-amount bands.
    pub fn issue_order_code(
        ctx: Context<IssueOrderCode>,
        code: String,
        order_amount: u64,
        expires_in_days: u16,
    ) -> Result<()> {
        instructions::issue_order_code::issue_order_code(ctx, code, order_amount, expires_in_days)
    }

    /// Activate a code for a user.
    ///
    /// Flow:
    /// - checksum, existence, expiry, single use, binding and the social
    ///   cooldown are checked before anything is written
    /// - petals and the spin credit are applied, the code is marked used and a
    ///   ledger entry is appended, all in this transaction
    ///
    /// Business-rule failures come back as a rejected receipt, not an error.
    pub fn activate_code(
        ctx: Context<ActivateCode>,
        code: String,
        user_id: String,
    ) -> Result<ActivationReceipt> {
        instructions::activate_code::activate_code(ctx, code, user_id)
    }

    /// Spend petals on a catalogue reward and mint a REWARD code bound to the
    /// user. `code` must be the one derived from the user's entry count.
    pub fn exchange_reward(
        ctx: Context<ExchangeReward>,
        user_id: String,
        reward_id: String,
        code: String,
    ) -> Result<ExchangeReceipt> {
        instructions::exchange_reward::exchange_reward(ctx, user_id, reward_id, code)
    }

    /// Operator correction of a balance. Positive deltas credit, negative
    /// deltas debit.
    pub fn adjust_balance(
        ctx: Context<AdjustBalance>,
        user_id: String,
        delta: i64,
        note: String,
    ) -> Result<AdjustmentReceipt> {
        instructions::adjust_balance::adjust_balance(ctx, user_id, delta, note)
    }

    /// Spin the prize wheel.
    pub fn spin_wheel(ctx: Context<SpinWheel>, user_id: String, nonce: u64) -> Result<SpinReceipt> {
        instructions::spin_wheel::spin_wheel(ctx, user_id, nonce)
    }

    pub fn wheel_configuration(ctx: Context<WheelConfiguration>) -> Result<Vec<Prize>> {
        instructions::wheel_configuration::wheel_configuration(ctx)
    }

    /// Record who invited a user. First inviter wins.
    pub fn process_referral(
        ctx: Context<ProcessReferral>,
        invitee_id: String,
        inviter_id: String,
    ) -> Result<ReferralReceipt> {
        instructions::process_referral::process_referral(ctx, invitee_id, inviter_id)
    }

    /// Confirm the invitee's first order and pay both referral bonuses
    /// atomically.
    ///
    /// `inviter_id` only resolves the inviter's accounts; it must match the
    /// stored referral row.
    pub fn confirm_first_order(
        ctx: Context<ConfirmFirstOrder>,
        invitee_id: String,
        inviter_id: String,
        order_amount: u64,
    ) -> Result<PayoutReceipt> {
        instructions::confirm_first_order::confirm_first_order(
            ctx,
            invitee_id,
            inviter_id,
            order_amount,
        )
    }

    pub fn referral_stats(ctx: Context<ReferralStats>, inviter_id: String) -> Result<ReferralStatsView> {
        instructions::referral_stats::referral_stats(ctx, inviter_id)
    }

    /// Balance, spin eligibility and social cooldown of a user.
    pub fn account_status(ctx: Context<AccountStatusQuery>, user_id: String) -> Result<AccountStatus> {
        instructions::account_status::account_status(ctx, user_id)
    }
}
