//! Referral bookkeeping.
//!
//! A referral row is keyed by its invitee, so the first inviter to register
//! wins and later attempts are no-ops. Payout credits both parties and marks
//! the row paid in one unit.

use crate::constants::*;
use crate::cooldown::{calendar_year, CooldownPolicy};
use crate::errors::LoyaltyError;
use crate::ledger::Posting;
use crate::receipts::ReferralStatsView;
use crate::states::{Balance, EntryKind, LoyaltyConfig, Referral, ReferrerStats, UserAccount};

type ReferralResult<T> = core::result::Result<T, LoyaltyError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferralStatus {
    Pending,
    Confirmed,
    BonusPaid,
}

impl ReferralStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "pending",
            ReferralStatus::Confirmed => "confirmed",
            ReferralStatus::BonusPaid => "bonus_paid",
        }
    }
}

/// Economy numbers a payout runs with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReferralTerms {
    pub min_order: u64,
    pub invitee_bonus: u64,
    pub inviter_bonus: u64,
}

impl Default for ReferralTerms {
    fn default() -> Self {
        Self {
            min_order: DEFAULT_REFERRAL_MIN_ORDER,
            invitee_bonus: DEFAULT_INVITEE_BONUS,
            inviter_bonus: DEFAULT_INVITER_BONUS,
        }
    }
}

impl From<&LoyaltyConfig> for ReferralTerms {
    fn from(config: &LoyaltyConfig) -> Self {
        Self {
            min_order: config.referral_min_order,
            invitee_bonus: config.invitee_bonus,
            inviter_bonus: config.inviter_bonus,
        }
    }
}

/// What a registration attempt should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    Create,
    /// The invitee already has an inviter.
    AlreadyReferred,
}

/// Decides a `process_referral` call. Checks run in order: self-referral,
/// existing row, then the inviter's yearly cap.
pub fn evaluate_registration(
    invitee_id: &str,
    inviter_id: &str,
    already_referred: bool,
    stats: &ReferrerStats,
    now: i64,
    policy: &CooldownPolicy,
) -> ReferralResult<Registration> {
    if invitee_id == inviter_id {
        return Err(LoyaltyError::SelfReferral);
    }
    if already_referred {
        return Ok(Registration::AlreadyReferred);
    }
    if !policy.within_referral_yearly_cap(stats.paid_this_year(now)) {
        return Err(LoyaltyError::YearlyLimitReached);
    }
    Ok(Registration::Create)
}

impl Referral {
    pub fn open(&mut self, inviter_id: &str, invitee_id: &str, now: i64, bump: u8) {
        self.inviter_id = inviter_id.to_string();
        self.invitee_id = invitee_id.to_string();
        self.first_order_confirmed_at = None;
        self.first_order_amount = None;
        self.bonus_paid = false;
        self.created_at = now;
        self.bump = bump;
    }

    pub fn is_pending(&self) -> bool {
        self.first_order_confirmed_at.is_none()
    }

    pub fn status(&self) -> ReferralStatus {
        if self.bonus_paid {
            ReferralStatus::BonusPaid
        } else if self.first_order_confirmed_at.is_some() {
            ReferralStatus::Confirmed
        } else {
            ReferralStatus::Pending
        }
    }
}

impl ReferrerStats {
    /// Fills a freshly created aggregate. No-op for an existing one.
    pub fn open(&mut self, inviter_id: &str, bump: u8) {
        if !self.inviter_id.is_empty() {
            return;
        }
        self.inviter_id = inviter_id.to_string();
        self.bump = bump;
    }

    /// Paid referrals confirmed in the calendar year of `now`.
    pub fn paid_this_year(&self, now: i64) -> u32 {
        if self.year == calendar_year(now) {
            self.paid_in_year
        } else {
            0
        }
    }

    pub fn record_referral(&mut self) -> ReferralResult<()> {
        self.total = self.total.checked_add(1).ok_or(LoyaltyError::Overflow)?;
        Ok(())
    }

    pub fn record_payout(&mut self, now: i64) -> ReferralResult<()> {
        let year = calendar_year(now);
        let paid = self.paid_this_year(now);
        self.successful = self
            .successful
            .checked_add(1)
            .ok_or(LoyaltyError::Overflow)?;
        self.paid_in_year = paid.checked_add(1).ok_or(LoyaltyError::Overflow)?;
        self.year = year;
        Ok(())
    }

    pub fn view(&self, now: i64, policy: &CooldownPolicy, inviter_bonus: u64) -> ReferralStatsView {
        let this_year = self.paid_this_year(now);
        ReferralStatsView {
            total: self.total,
            successful: self.successful,
            pending: self.total.saturating_sub(self.successful),
            total_bonus_earned: self.successful.saturating_mul(inviter_bonus),
            referrals_this_year: this_year,
            remaining_this_year: policy.remaining_referrals(this_year),
        }
    }
}

/// Both ledger postings of a paid referral.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payout {
    pub invitee: Posting,
    pub inviter: Posting,
}

/// Confirms the invitee's first order and pays both bonuses.
///
/// Nothing is mutated unless every step succeeds.
pub fn confirm_first_order(
    referral: Option<&mut Referral>,
    invitee: &mut Balance,
    inviter: &mut Balance,
    stats: &mut ReferrerStats,
    order_amount: u64,
    now: i64,
    terms: &ReferralTerms,
) -> ReferralResult<Payout> {
    if order_amount < terms.min_order {
        return Err(LoyaltyError::BelowMinimumOrder);
    }
    let referral = match referral {
        Some(row) if row.is_pending() => row,
        _ => return Err(LoyaltyError::NoPendingReferral),
    };

    let invitee_posting = invitee.credit(
        terms.invitee_bonus,
        EntryKind::ReferralBonus,
        format!(
            "type=invitee_bonus;order_amount={};inviter_id={}",
            order_amount, referral.inviter_id
        ),
    )?;
    let inviter_posting = match inviter.credit(
        terms.inviter_bonus,
        EntryKind::ReferralBonus,
        format!(
            "type=inviter_bonus;order_amount={};invitee_id={}",
            order_amount, referral.invitee_id
        ),
    ) {
        Ok(posting) => posting,
        Err(err) => {
            invitee.petals -= terms.invitee_bonus;
            return Err(err);
        }
    };
    let stats_before = (stats.successful, stats.year, stats.paid_in_year);
    if let Err(err) = stats.record_payout(now) {
        invitee.petals -= terms.invitee_bonus;
        inviter.petals -= terms.inviter_bonus;
        (stats.successful, stats.year, stats.paid_in_year) = stats_before;
        return Err(err);
    }

    referral.first_order_confirmed_at = Some(now);
    referral.first_order_amount = Some(order_amount);
    referral.bonus_paid = true;

    Ok(Payout {
        invitee: invitee_posting,
        inviter: inviter_posting,
    })
}

/// One row of an inviter's referral list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferralSummary {
    pub invitee_id: String,
    pub invitee_first_name: Option<String>,
    pub invitee_username: Option<String>,
    pub first_order_confirmed_at: Option<i64>,
    pub first_order_amount: Option<u64>,
    pub bonus_paid: bool,
    pub created_at: i64,
    pub status: ReferralStatus,
}

/// The inviter's most recent referrals, newest first, with invitee profile
/// fields looked up in `profiles`.
pub fn list(inviter_id: &str, referrals: &[Referral], profiles: &[UserAccount]) -> Vec<ReferralSummary> {
    let mut own: Vec<&Referral> = referrals
        .iter()
        .filter(|row| row.inviter_id == inviter_id)
        .collect();
    own.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.invitee_id.cmp(&b.invitee_id))
    });
    own.truncate(REFERRAL_LIST_LIMIT);

    own.into_iter()
        .map(|row| {
            let profile = profiles.iter().find(|p| p.user_id == row.invitee_id);
            let non_empty = |field: &String| Some(field.clone()).filter(|f| !f.is_empty());
            ReferralSummary {
                invitee_id: row.invitee_id.clone(),
                invitee_first_name: profile.and_then(|p| non_empty(&p.first_name)),
                invitee_username: profile.and_then(|p| non_empty(&p.username)),
                first_order_confirmed_at: row.first_order_confirmed_at,
                first_order_amount: row.first_order_amount,
                bonus_paid: row.bonus_paid,
                created_at: row.created_at,
                status: row.status(),
            }
        })
        .collect()
}
