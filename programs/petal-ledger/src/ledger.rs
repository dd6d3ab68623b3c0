//! Balance arithmetic and the append-only entry log.
//!
//! Every petal mutation returns a [`Posting`]; the instruction that applied it
//! writes the posting as a [`LedgerEntry`] in the same transaction, so the
//! balance and its log either both change or neither does.

use anchor_lang::prelude::*;

use crate::constants::*;
use crate::cooldown::CooldownPolicy;
use crate::errors::LoyaltyError;
use crate::receipts::AccountStatus;
use crate::states::{Balance, EntryKind, LedgerEntry, UserAccount};

type LedgerResult<T> = core::result::Result<T, LoyaltyError>;

/// A balance change that still has to be written to the log.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Posting {
    pub delta: i64,
    pub kind: EntryKind,
    pub memo: String,
}

impl Posting {
    pub fn into_entry(self, user_id: &str, seq: u64, created_at: i64) -> LedgerEntry {
        LedgerEntry {
            user_id: user_id.to_string(),
            seq,
            delta: self.delta,
            kind: self.kind,
            memo: self.memo,
            created_at,
        }
    }
}

/// Cuts `memo` to the on-chain cap without splitting a character.
pub fn clamp_memo(mut memo: String) -> String {
    if memo.len() > MAX_MEMO_LEN {
        let mut cut = MAX_MEMO_LEN;
        while !memo.is_char_boundary(cut) {
            cut -= 1;
        }
        memo.truncate(cut);
    }
    memo
}

impl Balance {
    /// Fills a freshly created balance. No-op for an existing one.
    pub fn open(&mut self, user_id: &str, bump: u8) -> bool {
        if !self.user_id.is_empty() {
            return false;
        }
        self.user_id = user_id.to_string();
        self.petals = 0;
        self.spin_credits = 0;
        self.last_spin_at = None;
        self.last_social_at = None;
        self.entry_count = 0;
        self.bump = bump;
        true
    }

    /// Adds `amount` petals. A zero amount is allowed and records a
    /// value-less entry (wheel gifts, reward codes).
    pub fn credit(&mut self, amount: u64, kind: EntryKind, memo: String) -> LedgerResult<Posting> {
        let delta = i64::try_from(amount).map_err(|_| LoyaltyError::Overflow)?;
        let petals = self
            .petals
            .checked_add(amount)
            .ok_or(LoyaltyError::Overflow)?;
        self.petals = petals;
        Ok(Posting {
            delta,
            kind,
            memo: clamp_memo(memo),
        })
    }

    /// Removes `amount` petals; rejected (state untouched) if the balance
    /// would go negative.
    pub fn debit(&mut self, amount: u64, kind: EntryKind, memo: String) -> LedgerResult<Posting> {
        if amount == 0 {
            return Err(LoyaltyError::InvalidAmount);
        }
        let delta = i64::try_from(amount)
            .map(|d| -d)
            .map_err(|_| LoyaltyError::Overflow)?;
        if self.petals < amount {
            return Err(LoyaltyError::InsufficientFunds);
        }
        self.petals -= amount;
        Ok(Posting {
            delta,
            kind,
            memo: clamp_memo(memo),
        })
    }

    /// Applies a signed delta: credit when positive, debit when negative.
    pub fn apply_delta(&mut self, delta: i64, kind: EntryKind, memo: String) -> LedgerResult<Posting> {
        if delta >= 0 {
            self.credit(delta.unsigned_abs(), kind, memo)
        } else {
            self.debit(delta.unsigned_abs(), kind, memo)
        }
    }

    /// Raises spin credits towards the ceiling; surplus is dropped silently.
    /// Returns how many credits were actually added.
    pub fn grant_spin_credit(&mut self, amount: u8) -> u8 {
        let before = self.spin_credits;
        self.spin_credits = self.spin_credits.saturating_add(amount).min(MAX_SPIN_CREDITS);
        self.spin_credits.saturating_sub(before)
    }

    /// Spends one spin credit and stamps the spin time.
    pub fn consume_spin_credit(&mut self, now: i64, policy: &CooldownPolicy) -> LedgerResult<()> {
        if self.spin_credits == 0 {
            return Err(LoyaltyError::NoCredit);
        }
        if !policy.can_spin(self.last_spin_at, now) {
            return Err(LoyaltyError::CooldownActive);
        }
        self.spin_credits -= 1;
        self.last_spin_at = Some(now);
        Ok(())
    }

    /// Whether a spin would currently be accepted.
    pub fn can_spin(&self, now: i64, policy: &CooldownPolicy) -> bool {
        self.spin_credits > 0 && policy.can_spin(self.last_spin_at, now)
    }

    pub fn status(&self, user_id: &str, now: i64, policy: &CooldownPolicy) -> AccountStatus {
        AccountStatus {
            user_id: user_id.to_string(),
            petals: self.petals,
            spin_credits: self.spin_credits,
            can_spin: self.can_spin(now, policy),
            next_spin_at: self.last_spin_at.map(|at| policy.next_spin_at(at)),
            days_until_next_spin: policy.days_until_next_spin(self.last_spin_at, now),
            social_eligible: policy.can_claim_social_activity(self.last_social_at, now),
            days_until_next_social: policy.days_until_next_social(self.last_social_at, now),
            entry_count: self.entry_count,
        }
    }

    /// Whether the cooldown stamps agree with the user's entry log: the last
    /// SOCIAL activation and the last wheel payout are both recorded as
    /// entries in the transaction that set the stamp.
    pub fn agrees_with_log<'a, I>(&self, entries: I) -> bool
    where
        I: IntoIterator<Item = &'a LedgerEntry> + Clone,
    {
        self.last_social_at == last_entry_at(entries.clone(), EntryKind::SocialActivity)
            && self.last_spin_at == last_entry_at(entries, EntryKind::WheelWin)
    }

    /// Reserves the next entry sequence number.
    pub fn next_entry_seq(&mut self) -> LedgerResult<u64> {
        let seq = self.entry_count;
        self.entry_count = seq.checked_add(1).ok_or(LoyaltyError::Overflow)?;
        Ok(seq)
    }
}

/// Display fields supplied by the identity layer.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub username: String,
}

impl Profile {
    pub fn validate(&self) -> LedgerResult<()> {
        if self.first_name.len() > MAX_PROFILE_FIELD_LEN || self.username.len() > MAX_PROFILE_FIELD_LEN {
            return Err(LoyaltyError::ProfileFieldTooLong);
        }
        Ok(())
    }
}

impl UserAccount {
    /// Fills a freshly created user. Returns false for an existing one.
    pub fn open(&mut self, user_id: &str, now: i64, bump: u8) -> bool {
        if !self.user_id.is_empty() {
            return false;
        }
        self.user_id = user_id.to_string();
        self.referral_parent = None;
        self.created_at = now;
        self.bump = bump;
        true
    }

    /// Refreshes display fields; empty values keep what is stored.
    pub fn update_profile(&mut self, profile: &Profile) -> LedgerResult<()> {
        profile.validate()?;
        if !profile.first_name.is_empty() {
            self.first_name = profile.first_name.clone();
        }
        if !profile.username.is_empty() {
            self.username = profile.username.clone();
        }
        Ok(())
    }

    /// Records the inviter once; later calls keep the first one.
    pub fn set_referral_parent(&mut self, inviter_id: &str) {
        if self.referral_parent.is_none() {
            self.referral_parent = Some(inviter_id.to_string());
        }
    }
}

/// Most recent `limit` entries of one user, newest first.
///
/// Takes whatever entry accounts the caller fetched; every call works on its
/// own snapshot, so re-querying simply yields a fresh page.
pub fn history<I>(entries: I, user_id: &str, limit: usize) -> Vec<LedgerEntry>
where
    I: IntoIterator<Item = LedgerEntry>,
{
    let mut own: Vec<LedgerEntry> = entries
        .into_iter()
        .filter(|entry| entry.user_id == user_id)
        .collect();
    own.sort_by(|a, b| b.seq.cmp(&a.seq));
    own.truncate(limit);
    own
}

/// Timestamp of the newest entry of `kind`, if any.
pub fn last_entry_at<'a, I>(entries: I, kind: EntryKind) -> Option<i64>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    entries
        .into_iter()
        .filter(|entry| entry.kind == kind)
        .max_by_key(|entry| entry.seq)
        .map(|entry| entry.created_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::thread;

    fn balance(petals: u64) -> Balance {
        Balance {
            user_id: "U1".to_string(),
            petals,
            ..Default::default()
        }
    }

    #[test]
    fn test_open_is_idempotent() {
        let mut fresh = Balance::default();
        assert!(fresh.open("U1", 254));
        fresh.petals = 9;
        assert!(!fresh.open("U1", 254));
        assert_eq!(fresh.petals, 9);
        assert_eq!(fresh.bump, 254);
    }

    #[test]
    fn test_user_open_and_profile_refresh() {
        let mut user = UserAccount::default();
        assert!(user.open("U1", 100, 253));
        user.update_profile(&Profile {
            first_name: "Anna".into(),
            username: "anna_k".into(),
        })
        .unwrap();
        user.update_profile(&Profile {
            first_name: String::new(),
            username: "anna".into(),
        })
        .unwrap();
        assert_eq!(user.first_name, "Anna");
        assert_eq!(user.username, "anna");
        assert!(!user.open("U1", 200, 253));
        assert_eq!(user.created_at, 100);

        let long = Profile {
            first_name: "a".repeat(MAX_PROFILE_FIELD_LEN + 1),
            username: String::new(),
        };
        assert_eq!(user.update_profile(&long), Err(LoyaltyError::ProfileFieldTooLong));
    }

    #[test]
    fn test_referral_parent_is_set_once() {
        let mut user = UserAccount::default();
        user.open("U2", 0, 1);
        user.set_referral_parent("U1");
        user.set_referral_parent("U3");
        assert_eq!(user.referral_parent.as_deref(), Some("U1"));
    }

    #[test]
    fn test_credit_and_debit_produce_postings() {
        let mut b = balance(0);
        let posting = b.credit(3, EntryKind::PromoActivation, "code=X".into()).unwrap();
        assert_eq!(posting.delta, 3);
        assert_eq!(b.petals, 3);

        let posting = b.debit(2, EntryKind::RewardExchange, String::new()).unwrap();
        assert_eq!(posting.delta, -2);
        assert_eq!(posting.kind, EntryKind::RewardExchange);
        assert_eq!(b.petals, 1);
    }

    #[test]
    fn test_debit_beyond_balance_leaves_state_unchanged() {
        let mut b = balance(5);
        assert_eq!(
            b.debit(6, EntryKind::RewardExchange, String::new()),
            Err(LoyaltyError::InsufficientFunds)
        );
        assert_eq!(b.petals, 5);
        assert_eq!(
            b.debit(0, EntryKind::RewardExchange, String::new()),
            Err(LoyaltyError::InvalidAmount)
        );
    }

    #[test]
    fn test_credit_overflow_is_an_error() {
        let mut b = balance(u64::MAX - 1);
        assert_eq!(
            b.credit(2, EntryKind::WheelWin, String::new()),
            Err(LoyaltyError::Overflow)
        );
        assert_eq!(b.petals, u64::MAX - 1);
    }

    #[test]
    fn test_petals_never_negative_over_mixed_sequence() {
        let mut b = balance(0);
        let mut expected: u64 = 0;
        // deterministic pseudo-random walk
        let mut x: u64 = 0x9E37_79B9_7F4A_7C15;
        for _ in 0..5_000 {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            let amount = x % 20 + 1;
            if x & 1 == 0 {
                b.credit(amount, EntryKind::WheelWin, String::new()).unwrap();
                expected += amount;
            } else {
                match b.debit(amount, EntryKind::RewardExchange, String::new()) {
                    Ok(_) => expected -= amount,
                    Err(e) => {
                        assert_eq!(e, LoyaltyError::InsufficientFunds);
                        assert!(expected < amount);
                    }
                }
            }
            assert_eq!(b.petals, expected);
        }
    }

    #[test]
    fn test_apply_delta_routes_by_sign() {
        let mut b = balance(4);
        assert_eq!(b.apply_delta(-4, EntryKind::AdminAdjustment, String::new()).unwrap().delta, -4);
        assert_eq!(
            b.apply_delta(-1, EntryKind::AdminAdjustment, String::new()),
            Err(LoyaltyError::InsufficientFunds)
        );
        assert_eq!(b.apply_delta(7, EntryKind::AdminAdjustment, String::new()).unwrap().delta, 7);
        assert_eq!(b.petals, 7);
    }

    #[test]
    fn test_spin_credit_ceiling() {
        let mut b = balance(0);
        assert_eq!(b.grant_spin_credit(1), 1);
        for amount in [1u8, 2, 5, u8::MAX] {
            assert_eq!(b.grant_spin_credit(amount), 0);
            assert_eq!(b.spin_credits, 1);
        }
    }

    #[test]
    fn test_consume_spin_credit() {
        let policy = CooldownPolicy::default();
        let now = 1_792_238_400;
        let mut b = balance(0);
        assert_eq!(b.consume_spin_credit(now, &policy), Err(LoyaltyError::NoCredit));

        b.grant_spin_credit(1);
        assert!(b.can_spin(now, &policy));
        b.consume_spin_credit(now, &policy).unwrap();
        assert_eq!(b.spin_credits, 0);
        assert_eq!(b.last_spin_at, Some(now));

        b.grant_spin_credit(1);
        assert_eq!(
            b.consume_spin_credit(now + SECONDS_PER_DAY, &policy),
            Err(LoyaltyError::CooldownActive)
        );
        assert_eq!(b.spin_credits, 1);
        b.consume_spin_credit(now + 14 * SECONDS_PER_DAY, &policy).unwrap();
    }

    #[test]
    fn test_status_reports_cooldowns() {
        let policy = CooldownPolicy::default();
        let now = 1_792_238_400;
        let mut b = balance(40);
        let fresh = b.status("U1", now, &policy);
        assert!(!fresh.can_spin);
        assert_eq!(fresh.next_spin_at, None);
        assert!(fresh.social_eligible);

        b.grant_spin_credit(1);
        b.consume_spin_credit(now, &policy).unwrap();
        b.grant_spin_credit(1);
        b.last_social_at = Some(now);
        let later = b.status("U1", now + 3 * SECONDS_PER_DAY, &policy);
        assert!(!later.can_spin);
        assert_eq!(later.next_spin_at, Some(now + 14 * SECONDS_PER_DAY));
        assert_eq!(later.days_until_next_spin, 11);
        assert!(!later.social_eligible);
        assert_eq!(later.days_until_next_social, 27);
        assert_eq!(later.petals, 40);
        assert_eq!(later.spin_credits, 1);
    }

    #[test]
    fn test_memo_is_clamped_on_char_boundary() {
        let memo = "й".repeat(MAX_MEMO_LEN);
        let clamped = clamp_memo(memo);
        assert!(clamped.len() <= MAX_MEMO_LEN);
        assert!(clamped.chars().all(|c| c == 'й'));
    }

    #[test]
    fn test_history_is_newest_first_and_limited() {
        let mut b = balance(0);
        let mut entries = Vec::new();
        for i in 0..30u64 {
            let posting = b.credit(i + 1, EntryKind::WheelWin, String::new()).unwrap();
            let seq = b.next_entry_seq().unwrap();
            entries.push(posting.into_entry("U1", seq, 1_000 + i as i64));
        }
        entries.push(LedgerEntry {
            user_id: "U2".into(),
            seq: 99,
            ..Default::default()
        });

        let page = history(entries.clone(), "U1", DEFAULT_HISTORY_LIMIT);
        assert_eq!(page.len(), 20);
        assert_eq!(page[0].seq, 29);
        assert_eq!(page[19].seq, 10);
        assert!(page.windows(2).all(|w| w[0].seq > w[1].seq));

        // restartable: a second query over the same snapshot is identical
        assert_eq!(
            history(entries, "U1", DEFAULT_HISTORY_LIMIT)
                .iter()
                .map(|e| e.seq)
                .collect::<Vec<_>>(),
            page.iter().map(|e| e.seq).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_last_entry_at_by_kind() {
        let entries = vec![
            LedgerEntry { seq: 0, kind: EntryKind::SocialActivity, created_at: 10, ..Default::default() },
            LedgerEntry { seq: 1, kind: EntryKind::WheelWin, created_at: 20, ..Default::default() },
            LedgerEntry { seq: 2, kind: EntryKind::SocialActivity, created_at: 30, ..Default::default() },
        ];
        assert_eq!(last_entry_at(&entries, EntryKind::SocialActivity), Some(30));
        assert_eq!(last_entry_at(&entries, EntryKind::ReferralBonus), None);
    }

    #[test]
    fn test_cooldown_stamps_agree_with_log() {
        let policy = CooldownPolicy::default();
        let mut b = balance(0);
        let mut entries = Vec::new();
        assert!(b.agrees_with_log(&entries));

        let posting = b.credit(5, EntryKind::SocialActivity, String::new()).unwrap();
        b.last_social_at = Some(100);
        let seq = b.next_entry_seq().unwrap();
        entries.push(posting.into_entry("U1", seq, 100));

        b.grant_spin_credit(1);
        b.consume_spin_credit(200, &policy).unwrap();
        let posting = b.credit(0, EntryKind::WheelWin, String::new()).unwrap();
        let seq = b.next_entry_seq().unwrap();
        entries.push(posting.into_entry("U1", seq, 200));
        assert!(b.agrees_with_log(&entries));

        b.last_social_at = Some(150);
        assert!(!b.agrees_with_log(&entries));
    }

    #[test]
    fn test_serialised_debits_never_overdraw() {
        // The runtime write-locks a balance per transaction; a mutex stands in.
        let shared = Arc::new(Mutex::new(balance(100)));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let mut ok = 0u64;
                    for _ in 0..10 {
                        let mut b = shared.lock().unwrap();
                        if b.debit(1, EntryKind::RewardExchange, String::new()).is_ok() {
                            ok += 1;
                        }
                    }
                    ok
                })
            })
            .collect();
        let succeeded: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(succeeded, 100);
        assert_eq!(shared.lock().unwrap().petals, 0);
    }
}
