//! Promo-code lifecycle: `Unissued -> Active -> {Expired | Used}`.

use crate::code_generator;
use crate::constants::*;
use crate::cooldown::CooldownPolicy;
use crate::errors::LoyaltyError;
use crate::ledger::Posting;
use crate::states::{Balance, CodeType, RedemptionCode};

type RedemptionResult<T> = core::result::Result<T, LoyaltyError>;

/// Parameters for a new code.
#[derive(Clone, Debug)]
pub struct CodeTerms {
    pub code_type: CodeType,
    pub petals_delta: i64,
    pub spin_credit: u8,
    pub expires_at: i64,
    pub bound_user_id: Option<String>,
}

/// Effects of one successful activation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activation {
    pub posting: Posting,
    pub code_type: CodeType,
    pub petals_added: i64,
    pub spin_credits_added: u8,
}

impl RedemptionCode {
    /// Fills a new code account. The code must carry a valid checksum.
    pub fn issue(
        &mut self,
        code: &str,
        terms: CodeTerms,
        issued_by: anchor_lang::prelude::Pubkey,
        now: i64,
        bump: u8,
    ) -> RedemptionResult<()> {
        if code.len() > MAX_CODE_LEN
            || !code_generator::is_canonical(code)
            || !code_generator::validate(code)
        {
            return Err(LoyaltyError::InvalidCode);
        }
        if terms.spin_credit > MAX_SPIN_CREDITS {
            return Err(LoyaltyError::InvalidAmount);
        }
        if let Some(bound) = &terms.bound_user_id {
            crate::errors::validate_user_id(bound)?;
        }
        let split = code.len() - 2;
        self.code = code.to_string();
        self.code_type = terms.code_type;
        self.petals_delta = terms.petals_delta;
        self.spin_credit = terms.spin_credit;
        self.expires_at = terms.expires_at;
        self.single_use = true;
        self.bound_user_id = terms.bound_user_id;
        self.is_used = false;
        self.used_at = None;
        self.checksum = code[split..].to_string();
        self.issued_by = issued_by;
        self.created_at = now;
        self.bump = bump;
        Ok(())
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Checks 3-6 of an activation, in order; the first failure wins.
    pub fn check_activation(
        &self,
        user_id: &str,
        last_social_at: Option<i64>,
        now: i64,
        policy: &CooldownPolicy,
    ) -> RedemptionResult<()> {
        if self.is_expired(now) {
            return Err(LoyaltyError::CodeExpired);
        }
        if self.is_used {
            return Err(LoyaltyError::AlreadyUsed);
        }
        if let Some(bound) = &self.bound_user_id {
            if bound != user_id {
                return Err(LoyaltyError::WrongOwner);
            }
        }
        if self.code_type == CodeType::Social
            && !policy.can_claim_social_activity(last_social_at, now)
        {
            return Err(LoyaltyError::SocialCooldownActive);
        }
        Ok(())
    }

    fn mark_used(&mut self, user_id: &str, now: i64) {
        self.is_used = true;
        self.used_at = Some(now);
        self.bound_user_id = Some(user_id.to_string());
    }

    fn activation_memo(&self) -> String {
        format!(
            "promo_code={};type={};spin_credits_added={}",
            self.code,
            self.code_type.as_str(),
            self.spin_credit
        )
    }
}

/// Runs a full activation of `code` by `user_id`.
///
/// `stored` is the code account, if one exists. Effects are applied only
/// after every check has passed, and the only fallible effect (the petal
/// posting) runs first, so an error leaves `stored` and `balance` untouched.
pub fn activate(
    code: &str,
    stored: Option<&mut RedemptionCode>,
    balance: &mut Balance,
    user_id: &str,
    now: i64,
    policy: &CooldownPolicy,
) -> RedemptionResult<Activation> {
    let code = code_generator::normalize(code);
    if !code_generator::is_canonical(&code) || !code_generator::validate(&code) {
        return Err(LoyaltyError::InvalidCode);
    }
    let stored = stored.ok_or(LoyaltyError::CodeNotFound)?;
    if stored.code != code {
        return Err(LoyaltyError::CodeNotFound);
    }
    stored.check_activation(user_id, balance.last_social_at, now, policy)?;

    let kind = stored.code_type.entry_kind();
    let posting = balance.apply_delta(stored.petals_delta, kind, stored.activation_memo())?;
    let spin_credits_added = if stored.spin_credit > 0 {
        balance.grant_spin_credit(stored.spin_credit)
    } else {
        0
    };
    if stored.code_type == CodeType::Social {
        balance.last_social_at = Some(now);
    }
    stored.mark_used(user_id, now);

    Ok(Activation {
        posting,
        code_type: stored.code_type,
        petals_added: stored.petals_delta,
        spin_credits_added,
    })
}

/// Human-readable confirmation for a successful activation.
pub fn activation_message(activation: &Activation) -> String {
    match activation.code_type {
        CodeType::Order if activation.spin_credits_added > 0 => format!(
            "+{} petals credited. 1 spin available",
            activation.petals_added
        ),
        CodeType::Order => format!("+{} petals credited", activation.petals_added),
        CodeType::Social => format!("+{} petals for social activity", activation.petals_added),
        CodeType::Reward => "Reward code redeemed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SECONDS_PER_DAY;
    use crate::states::EntryKind;
    use anchor_lang::prelude::Pubkey;
    use std::sync::{Arc, Mutex};
    use std::thread;

    const NOW: i64 = 1_792_238_400;
    const ORDER_CODE: &str = "OR7F3K9QZX3C";

    fn issued(code: &str, terms: CodeTerms) -> RedemptionCode {
        let mut stored = RedemptionCode::default();
        stored.issue(code, terms, Pubkey::default(), NOW - 10, 255).unwrap();
        stored
    }

    fn order_terms() -> CodeTerms {
        CodeTerms {
            code_type: CodeType::Order,
            petals_delta: 3,
            spin_credit: 1,
            expires_at: NOW + 14 * SECONDS_PER_DAY,
            bound_user_id: None,
        }
    }

    fn social_code(seed: &[u8]) -> RedemptionCode {
        let generated = code_generator::generate_for(CodeType::Social, seed);
        issued(
            &generated.code,
            CodeTerms {
                code_type: CodeType::Social,
                petals_delta: 5,
                spin_credit: 0,
                expires_at: NOW + 14 * SECONDS_PER_DAY,
                bound_user_id: None,
            },
        )
    }

    fn wallet(user_id: &str) -> Balance {
        let mut balance = Balance::default();
        balance.open(user_id, 255);
        balance
    }

    #[test]
    fn test_order_redemption_scenario() {
        let policy = CooldownPolicy::default();
        let mut stored = issued(ORDER_CODE, order_terms());
        let mut balance = wallet("U1");

        let activation =
            activate(ORDER_CODE, Some(&mut stored), &mut balance, "U1", NOW, &policy).unwrap();

        assert_eq!(balance.petals, 3);
        assert_eq!(balance.spin_credits, 1);
        assert!(stored.is_used);
        assert_eq!(stored.used_at, Some(NOW));
        assert_eq!(stored.bound_user_id.as_deref(), Some("U1"));
        assert_eq!(activation.posting.delta, 3);
        assert_eq!(activation.posting.kind, EntryKind::PromoActivation);
        assert_eq!(activation_message(&activation), "+3 petals credited. 1 spin available");
    }

    #[test]
    fn test_second_activation_is_already_used() {
        let policy = CooldownPolicy::default();
        let mut stored = issued(ORDER_CODE, order_terms());
        let mut balance = wallet("U1");
        activate(ORDER_CODE, Some(&mut stored), &mut balance, "U1", NOW, &policy).unwrap();

        assert_eq!(
            activate(ORDER_CODE, Some(&mut stored), &mut balance, "U1", NOW, &policy),
            Err(LoyaltyError::AlreadyUsed)
        );
        assert_eq!(balance.petals, 3);
    }

    #[test]
    fn test_checksum_is_checked_before_lookup() {
        let policy = CooldownPolicy::default();
        let mut balance = wallet("U1");
        assert_eq!(
            activate("OR7F3K9QZXAB", None, &mut balance, "U1", NOW, &policy),
            Err(LoyaltyError::InvalidCode)
        );
        assert_eq!(
            activate(ORDER_CODE, None, &mut balance, "U1", NOW, &policy),
            Err(LoyaltyError::CodeNotFound)
        );
    }

    #[test]
    fn test_expired_beats_used_and_owner() {
        let policy = CooldownPolicy::default();
        let mut terms = order_terms();
        terms.bound_user_id = Some("U9".into());
        let mut stored = issued(ORDER_CODE, terms);
        stored.is_used = true;
        stored.expires_at = NOW;
        let mut balance = wallet("U1");

        assert_eq!(
            activate(ORDER_CODE, Some(&mut stored), &mut balance, "U1", NOW, &policy),
            Err(LoyaltyError::CodeExpired)
        );
        // boundary: one second earlier it is still alive, so `used` wins
        assert_eq!(
            activate(ORDER_CODE, Some(&mut stored), &mut balance, "U1", NOW - 1, &policy),
            Err(LoyaltyError::AlreadyUsed)
        );
    }

    #[test]
    fn test_pre_bound_code_rejects_other_users() {
        let policy = CooldownPolicy::default();
        let mut terms = order_terms();
        terms.bound_user_id = Some("U2".into());
        let mut stored = issued(ORDER_CODE, terms);
        let mut intruder = wallet("U1");

        assert_eq!(
            activate(ORDER_CODE, Some(&mut stored), &mut intruder, "U1", NOW, &policy),
            Err(LoyaltyError::WrongOwner)
        );
        assert!(!stored.is_used);
        assert_eq!(intruder.petals, 0);

        let mut owner = wallet("U2");
        activate(ORDER_CODE, Some(&mut stored), &mut owner, "U2", NOW, &policy).unwrap();
        assert_eq!(owner.petals, 3);
    }

    #[test]
    fn test_social_cooldown_is_enforced_per_user() {
        let policy = CooldownPolicy::default();
        let mut first = social_code(b"first");
        let mut second = social_code(b"second");
        second.expires_at = NOW + 60 * SECONDS_PER_DAY;
        let mut balance = wallet("U1");

        let code = first.code.clone();
        let activation = activate(&code, Some(&mut first), &mut balance, "U1", NOW, &policy).unwrap();
        assert_eq!(activation.posting.kind, EntryKind::SocialActivity);
        assert_eq!(balance.last_social_at, Some(NOW));

        let code = second.code.clone();
        let later = NOW + 29 * SECONDS_PER_DAY;
        assert_eq!(
            activate(&code, Some(&mut second), &mut balance, "U1", later, &policy),
            Err(LoyaltyError::SocialCooldownActive)
        );
        assert!(!second.is_used);

        let much_later = NOW + 30 * SECONDS_PER_DAY;
        activate(&code, Some(&mut second), &mut balance, "U1", much_later, &policy).unwrap();
        assert_eq!(balance.petals, 10);
    }

    #[test]
    fn test_reward_code_records_zero_value_activation() {
        let policy = CooldownPolicy::default();
        let generated = code_generator::generate_for(CodeType::Reward, b"reward");
        let mut stored = issued(
            &generated.code,
            CodeTerms {
                code_type: CodeType::Reward,
                petals_delta: 0,
                spin_credit: 0,
                expires_at: NOW + 30 * SECONDS_PER_DAY,
                bound_user_id: Some("U1".into()),
            },
        );
        let mut balance = wallet("U1");
        let activation =
            activate(&generated.code, Some(&mut stored), &mut balance, "U1", NOW, &policy).unwrap();
        assert_eq!(activation.posting.delta, 0);
        assert_eq!(activation.posting.kind, EntryKind::PromoActivation);
        assert_eq!(balance.petals, 0);
    }

    #[test]
    fn test_failed_debit_rolls_back_everything() {
        let policy = CooldownPolicy::default();
        let mut terms = order_terms();
        terms.petals_delta = -5;
        let mut stored = issued(ORDER_CODE, terms);
        let mut balance = wallet("U1");

        assert_eq!(
            activate(ORDER_CODE, Some(&mut stored), &mut balance, "U1", NOW, &policy),
            Err(LoyaltyError::InsufficientFunds)
        );
        assert!(!stored.is_used);
        assert_eq!(stored.bound_user_id, None);
        assert_eq!(balance.spin_credits, 0);
    }

    #[test]
    fn test_surplus_spin_credit_is_discarded() {
        let policy = CooldownPolicy::default();
        let mut first = issued(ORDER_CODE, order_terms());
        let mut balance = wallet("U1");
        activate(ORDER_CODE, Some(&mut first), &mut balance, "U1", NOW, &policy).unwrap();

        let generated = code_generator::generate_for(CodeType::Order, b"another");
        let mut second = issued(&generated.code, order_terms());
        let activation =
            activate(&generated.code, Some(&mut second), &mut balance, "U1", NOW, &policy).unwrap();
        assert_eq!(activation.spin_credits_added, 0);
        assert_eq!(balance.spin_credits, 1);
        assert_eq!(balance.petals, 6);
    }

    #[test]
    fn test_issue_rejects_bad_codes() {
        let mut stored = RedemptionCode::default();
        assert_eq!(
            stored.issue("OR7F3K9QZXAB", order_terms(), Pubkey::default(), NOW, 1),
            Err(LoyaltyError::InvalidCode)
        );
        let mut terms = order_terms();
        terms.spin_credit = 2;
        assert_eq!(
            stored.issue(ORDER_CODE, terms, Pubkey::default(), NOW, 1),
            Err(LoyaltyError::InvalidAmount)
        );
        assert_eq!(
            stored.issue("OR7F3K9QZX3c", order_terms(), Pubkey::default(), NOW, 1),
            Err(LoyaltyError::InvalidCode)
        );
        stored.issue(ORDER_CODE, order_terms(), Pubkey::default(), NOW, 1).unwrap();
        assert_eq!(stored.checksum, "3C");
    }

    #[test]
    fn test_case_variants_activate_the_same_code_once() {
        let policy = CooldownPolicy::default();
        let mut stored = issued(ORDER_CODE, order_terms());
        let mut balance = wallet("U1");

        activate(" or7f3k9qzx3c", Some(&mut stored), &mut balance, "U1", NOW, &policy).unwrap();
        assert_eq!(balance.petals, 3);
        assert_eq!(
            activate("OR7F3K9QZX3c", Some(&mut stored), &mut balance, "U1", NOW, &policy),
            Err(LoyaltyError::AlreadyUsed)
        );
    }

    #[test]
    fn test_exactly_one_concurrent_activation_wins() {
        // The code account is write-locked per transaction; a mutex stands in.
        let policy = CooldownPolicy::default();
        let shared = Arc::new(Mutex::new(issued(ORDER_CODE, order_terms())));
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let user = format!("U{}", i);
                    let mut balance = wallet(&user);
                    let mut stored = shared.lock().unwrap();
                    activate(ORDER_CODE, Some(&mut *stored), &mut balance, &user, NOW, &policy)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| *r == Err(LoyaltyError::AlreadyUsed)));
    }
}
