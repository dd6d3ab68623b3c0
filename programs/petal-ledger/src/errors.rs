use anchor_lang::prelude::*;

#[error_code]
#[derive(PartialEq, Eq)]
pub enum LoyaltyError {
    // Input validation
    #[msg("Invalid code")]
    InvalidCode,
    #[msg("Amount must be positive")]
    InvalidAmount,
    #[msg("User id is empty or too long")]
    InvalidUserId,
    #[msg("Profile field is too long")]
    ProfileFieldTooLong,
    #[msg("Invalid config value")]
    InvalidConfig,

    // Redemption
    #[msg("Code not found")]
    CodeNotFound,
    #[msg("Code has expired")]
    CodeExpired,
    #[msg("Code already activated")]
    AlreadyUsed,
    #[msg("Code cannot be used by this user")]
    WrongOwner,
    #[msg("Social activity can be claimed once per cooldown period")]
    SocialCooldownActive,

    // Ledger
    #[msg("Insufficient petals")]
    InsufficientFunds,
    #[msg("No spin credits available")]
    NoCredit,
    #[msg("Wheel cooldown is active")]
    CooldownActive,

    // Referrals
    #[msg("Yearly referral limit reached")]
    YearlyLimitReached,
    #[msg("Users cannot refer themselves")]
    SelfReferral,
    #[msg("Order amount is below the referral minimum")]
    BelowMinimumOrder,
    #[msg("No pending referral for this user")]
    NoPendingReferral,

    // Catalogue / economy
    #[msg("Reward not found")]
    RewardNotFound,
    #[msg("Reward is not available")]
    RewardInactive,
    #[msg("No economy band covers this order amount")]
    NoOrderBand,

    // Integrity / authority
    #[msg("Arithmetic overflow")]
    Overflow,
    #[msg("Account address does not match its seeds")]
    UnexpectedAccountAddress,
    #[msg("Account already exists")]
    AccountAlreadyExists,
    #[msg("Account is not owned by this program")]
    ForeignAccount,
    #[msg("Inviter does not match the stored referral")]
    InviterMismatch,
    #[msg("Signer is not the admin")]
    NotAdmin,
    #[msg("Signer is not the operator")]
    NotOperator,
    #[msg("Slot hashes sysvar is unreadable")]
    InvalidSlotHashes,
}

impl LoyaltyError {
    /// Expected, user-facing outcomes. These are reported inside a receipt
    /// instead of failing the transaction.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            LoyaltyError::InvalidAmount
                | LoyaltyError::InvalidUserId
                | LoyaltyError::ProfileFieldTooLong
                | LoyaltyError::InvalidConfig
                | LoyaltyError::Overflow
                | LoyaltyError::UnexpectedAccountAddress
                | LoyaltyError::AccountAlreadyExists
                | LoyaltyError::ForeignAccount
                | LoyaltyError::InviterMismatch
                | LoyaltyError::NotAdmin
                | LoyaltyError::NotOperator
                | LoyaltyError::InvalidSlotHashes
        )
    }

    /// Status an HTTP gateway in front of the program should answer with.
    /// Off-chain callers map a `Rejection::code` back through
    /// `LoyaltyError` and call this; the program itself never does.
    pub fn status_hint(&self) -> u16 {
        match self {
            LoyaltyError::CodeNotFound
            | LoyaltyError::RewardNotFound
            | LoyaltyError::NoPendingReferral => 404,
            LoyaltyError::AlreadyUsed
            | LoyaltyError::YearlyLimitReached
            | LoyaltyError::AccountAlreadyExists
            | LoyaltyError::UnexpectedAccountAddress => 409,
            LoyaltyError::NotAdmin | LoyaltyError::NotOperator => 403,
            LoyaltyError::Overflow
            | LoyaltyError::ForeignAccount
            | LoyaltyError::InvalidSlotHashes => 500,
            _ => 400,
        }
    }

    /// Coarse grouping for gateway logs and dashboards; like
    /// [`Self::status_hint`], only used off-chain.
    pub fn category(&self) -> &'static str {
        match self {
            LoyaltyError::InvalidCode
            | LoyaltyError::InvalidAmount
            | LoyaltyError::InvalidUserId
            | LoyaltyError::ProfileFieldTooLong
            | LoyaltyError::InvalidConfig => "Input Validation",
            LoyaltyError::CodeNotFound
            | LoyaltyError::CodeExpired
            | LoyaltyError::AlreadyUsed
            | LoyaltyError::WrongOwner
            | LoyaltyError::SocialCooldownActive => "Redemption",
            LoyaltyError::InsufficientFunds
            | LoyaltyError::NoCredit
            | LoyaltyError::CooldownActive => "Ledger",
            LoyaltyError::YearlyLimitReached
            | LoyaltyError::SelfReferral
            | LoyaltyError::BelowMinimumOrder
            | LoyaltyError::NoPendingReferral => "Referral",
            LoyaltyError::RewardNotFound
            | LoyaltyError::RewardInactive
            | LoyaltyError::NoOrderBand => "Catalogue",
            _ => "Integrity",
        }
    }
}

/// Checks that a user id can be used as a PDA seed.
pub fn validate_user_id(user_id: &str) -> core::result::Result<(), LoyaltyError> {
    if user_id.is_empty() || user_id.len() > crate::constants::MAX_USER_ID_LEN {
        return Err(LoyaltyError::InvalidUserId);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejections_are_business_outcomes() {
        assert!(LoyaltyError::AlreadyUsed.is_rejection());
        assert!(LoyaltyError::InvalidCode.is_rejection());
        assert!(LoyaltyError::InsufficientFunds.is_rejection());
        assert!(LoyaltyError::BelowMinimumOrder.is_rejection());
        assert!(!LoyaltyError::Overflow.is_rejection());
        assert!(!LoyaltyError::UnexpectedAccountAddress.is_rejection());
        assert!(!LoyaltyError::NotOperator.is_rejection());
    }

    #[test]
    fn test_status_hints() {
        assert_eq!(LoyaltyError::InvalidCode.status_hint(), 400);
        assert_eq!(LoyaltyError::CodeNotFound.status_hint(), 404);
        assert_eq!(LoyaltyError::AlreadyUsed.status_hint(), 409);
        assert_eq!(LoyaltyError::WrongOwner.status_hint(), 400);
    }

    #[test]
    fn test_categories() {
        assert_eq!(LoyaltyError::CodeExpired.category(), "Redemption");
        assert_eq!(LoyaltyError::NoCredit.category(), "Ledger");
        assert_eq!(LoyaltyError::SelfReferral.category(), "Referral");
        assert_eq!(LoyaltyError::NotAdmin.category(), "Integrity");
    }

    #[test]
    fn test_user_id_validation() {
        assert!(validate_user_id("123456789").is_ok());
        assert_eq!(validate_user_id(""), Err(LoyaltyError::InvalidUserId));
        assert_eq!(
            validate_user_id(&"9".repeat(33)),
            Err(LoyaltyError::InvalidUserId)
        );
    }
}
