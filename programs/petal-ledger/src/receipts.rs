//! Structured results returned from instructions.
//!
//! Business-rule rejections travel inside these receipts with `success =
//! false`; the transaction still commits, but nothing was mutated.

use anchor_lang::prelude::*;

use crate::errors::LoyaltyError;
use crate::states::{Balance, Prize};

/// Spin animation length reported to clients.
pub const SPIN_DURATION_MS: u32 = 3_000;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    /// Numeric error code, as the runtime would report it.
    pub code: u32,
    /// Stable machine-readable reason (the variant name).
    pub reason: String,
    pub message: String,
}

impl From<LoyaltyError> for Rejection {
    fn from(err: LoyaltyError) -> Self {
        Self {
            code: u32::from(err),
            reason: err.name(),
            message: err.to_string(),
        }
    }
}

/// Splits an engine result into a value or a receipt-level rejection.
/// Anything that is not a business rejection is returned as a hard error.
pub fn triage<T>(
    result: core::result::Result<T, LoyaltyError>,
) -> Result<core::result::Result<T, Rejection>> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(err) if err.is_rejection() => {
            msg!("Rejected: {} ({})", err.name(), err);
            Ok(Err(Rejection::from(err)))
        }
        Err(err) => Err(err.into()),
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ActivationReceipt {
    pub success: bool,
    pub message: String,
    pub petals_added: i64,
    pub spin_credits_added: u8,
    pub petals: u64,
    pub spin_credits: u8,
    pub rejection: Option<Rejection>,
}

impl ActivationReceipt {
    pub fn rejected(rejection: Rejection, balance: &Balance) -> Self {
        Self {
            success: false,
            message: rejection.message.clone(),
            petals_added: 0,
            spin_credits_added: 0,
            petals: balance.petals,
            spin_credits: balance.spin_credits,
            rejection: Some(rejection),
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct SpinReceipt {
    pub success: bool,
    pub message: String,
    pub prize: Option<Prize>,
    /// Final wheel rotation in degrees. Cosmetic.
    pub angle: f64,
    pub duration_ms: u32,
    pub petals: u64,
    pub spin_credits: u8,
    pub rejection: Option<Rejection>,
}

impl SpinReceipt {
    pub fn rejected(rejection: Rejection, balance: &Balance) -> Self {
        Self {
            success: false,
            message: rejection.message.clone(),
            prize: None,
            angle: 0.0,
            duration_ms: 0,
            petals: balance.petals,
            spin_credits: balance.spin_credits,
            rejection: Some(rejection),
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExchangeReceipt {
    pub success: bool,
    pub message: String,
    pub code: Option<String>,
    pub expires_at: Option<i64>,
    pub petals: u64,
    pub spin_credits: u8,
    pub rejection: Option<Rejection>,
}

impl ExchangeReceipt {
    pub fn rejected(rejection: Rejection, balance: &Balance) -> Self {
        Self {
            success: false,
            message: rejection.message.clone(),
            code: None,
            expires_at: None,
            petals: balance.petals,
            spin_credits: balance.spin_credits,
            rejection: Some(rejection),
        }
    }
}

/// Result of a manual balance adjustment.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AdjustmentReceipt {
    pub success: bool,
    pub message: String,
    pub petals: u64,
    pub rejection: Option<Rejection>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct ReferralReceipt {
    pub success: bool,
    /// False when the invitee already had an inviter.
    pub created: bool,
    pub message: String,
    pub rejection: Option<Rejection>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct PayoutReceipt {
    pub success: bool,
    pub message: String,
    pub invitee_bonus: u64,
    pub inviter_bonus: u64,
    pub rejection: Option<Rejection>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferralStatsView {
    pub total: u64,
    pub successful: u64,
    pub pending: u64,
    pub total_bonus_earned: u64,
    pub referrals_this_year: u32,
    pub remaining_this_year: u32,
}

/// Balance plus eligibility, as seen at the time of the call.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AccountStatus {
    pub user_id: String,
    pub petals: u64,
    pub spin_credits: u8,
    pub can_spin: bool,
    pub next_spin_at: Option<i64>,
    pub days_until_next_spin: u32,
    pub social_eligible: bool,
    pub days_until_next_social: u32,
    pub entry_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_carries_code_reason_and_message() {
        let rejection = Rejection::from(LoyaltyError::AlreadyUsed);
        assert_eq!(rejection.reason, "AlreadyUsed");
        assert_eq!(rejection.message, "Code already activated");
        assert_eq!(rejection.code, u32::from(LoyaltyError::AlreadyUsed));
        assert!(rejection.code >= 6000);
    }

    #[test]
    fn test_triage_separates_rejections_from_failures() {
        let ok: core::result::Result<u8, LoyaltyError> = Ok(7);
        assert_eq!(triage(ok).unwrap(), Ok(7));

        let rejected: core::result::Result<u8, LoyaltyError> = Err(LoyaltyError::InsufficientFunds);
        let rejection = triage(rejected).unwrap().unwrap_err();
        assert_eq!(rejection.reason, "InsufficientFunds");

        let failed: core::result::Result<u8, LoyaltyError> = Err(LoyaltyError::Overflow);
        assert!(triage(failed).is_err());
    }

    #[test]
    fn test_rejected_receipts_report_current_balance() {
        let mut balance = Balance::default();
        balance.open("U1", 1);
        balance.petals = 4;
        let receipt = ActivationReceipt::rejected(LoyaltyError::CodeExpired.into(), &balance);
        assert!(!receipt.success);
        assert_eq!(receipt.petals, 4);
        assert_eq!(receipt.message, "Code has expired");
        assert_eq!(receipt.rejection.unwrap().reason, "CodeExpired");
    }
}
