//! Time-gated eligibility. Pure functions of timestamps; the only state they
//! read is what the ledger already records.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::constants::*;
use crate::states::LoyaltyConfig;

/// Cooldown windows and the referral cap in effect for one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CooldownPolicy {
    pub spin_cooldown_days: u16,
    pub social_cooldown_days: u16,
    pub referral_yearly_cap: u32,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            spin_cooldown_days: DEFAULT_SPIN_COOLDOWN_DAYS,
            social_cooldown_days: DEFAULT_SOCIAL_COOLDOWN_DAYS,
            referral_yearly_cap: DEFAULT_REFERRAL_YEARLY_CAP,
        }
    }
}

impl From<&LoyaltyConfig> for CooldownPolicy {
    fn from(config: &LoyaltyConfig) -> Self {
        Self {
            spin_cooldown_days: config.spin_cooldown_days,
            social_cooldown_days: config.social_cooldown_days,
            referral_yearly_cap: config.referral_yearly_cap,
        }
    }
}

impl CooldownPolicy {
    fn spin_window(&self) -> i64 {
        i64::from(self.spin_cooldown_days) * SECONDS_PER_DAY
    }

    fn social_window(&self) -> i64 {
        i64::from(self.social_cooldown_days) * SECONDS_PER_DAY
    }

    pub fn can_spin(&self, last_spin_at: Option<i64>, now: i64) -> bool {
        match last_spin_at {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.spin_window(),
        }
    }

    pub fn next_spin_at(&self, last_spin_at: i64) -> i64 {
        last_spin_at.saturating_add(self.spin_window())
    }

    /// Whole days (rounded up) until the wheel unlocks; 0 when it already has.
    pub fn days_until_next_spin(&self, last_spin_at: Option<i64>, now: i64) -> u32 {
        match last_spin_at {
            None => 0,
            Some(last) => days_until(self.next_spin_at(last), now),
        }
    }

    pub fn can_claim_social_activity(&self, last_social_at: Option<i64>, now: i64) -> bool {
        match last_social_at {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.social_window(),
        }
    }

    pub fn next_social_at(&self, last_social_at: i64) -> i64 {
        last_social_at.saturating_add(self.social_window())
    }

    pub fn days_until_next_social(&self, last_social_at: Option<i64>, now: i64) -> u32 {
        match last_social_at {
            None => 0,
            Some(last) => days_until(self.next_social_at(last), now),
        }
    }

    /// True while the inviter has fewer paid referrals this calendar year
    /// than the cap.
    pub fn within_referral_yearly_cap(&self, confirmed_this_year: u32) -> bool {
        confirmed_this_year < self.referral_yearly_cap
    }

    pub fn remaining_referrals(&self, confirmed_this_year: u32) -> u32 {
        self.referral_yearly_cap.saturating_sub(confirmed_this_year)
    }
}

fn days_until(target: i64, now: i64) -> u32 {
    let remaining = target.saturating_sub(now);
    if remaining <= 0 {
        return 0;
    }
    let days = (remaining + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// UTC calendar year of a unix timestamp.
pub fn calendar_year(ts: i64) -> i32 {
    let at = DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or(if ts < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    });
    at.year()
}

fn new_year(year: i32) -> i64 {
    match NaiveDate::from_ymd_opt(year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)) {
        Some(midnight) => midnight.and_utc().timestamp(),
        None if year < 0 => i64::MIN,
        None => i64::MAX,
    }
}

/// `[Jan 1 00:00, next Jan 1 00:00)` of `year`, as unix seconds.
pub fn year_bounds(year: i32) -> (i64, i64) {
    (new_year(year), new_year(year.saturating_add(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = SECONDS_PER_DAY;
    // 2026-10-17T12:00:00Z
    const NOW: i64 = 1_792_238_400;

    #[test]
    fn test_spin_cooldown_window() {
        let policy = CooldownPolicy::default();
        assert!(policy.can_spin(None, NOW));
        assert!(!policy.can_spin(Some(NOW - 14 * DAY + 1), NOW));
        assert!(policy.can_spin(Some(NOW - 14 * DAY), NOW));
        assert_eq!(policy.next_spin_at(NOW), NOW + 14 * DAY);
    }

    #[test]
    fn test_days_until_next_spin_rounds_up() {
        let policy = CooldownPolicy::default();
        assert_eq!(policy.days_until_next_spin(None, NOW), 0);
        assert_eq!(policy.days_until_next_spin(Some(NOW), NOW), 14);
        assert_eq!(policy.days_until_next_spin(Some(NOW - DAY - 1), NOW), 13);
        assert_eq!(policy.days_until_next_spin(Some(NOW - 20 * DAY), NOW), 0);
    }

    #[test]
    fn test_social_cooldown_window() {
        let policy = CooldownPolicy::default();
        assert!(policy.can_claim_social_activity(None, NOW));
        assert!(!policy.can_claim_social_activity(Some(NOW - 29 * DAY), NOW));
        assert!(policy.can_claim_social_activity(Some(NOW - 30 * DAY), NOW));
        assert_eq!(policy.days_until_next_social(Some(NOW - 29 * DAY), NOW), 1);
    }

    #[test]
    fn test_configured_windows() {
        let policy = CooldownPolicy {
            spin_cooldown_days: 1,
            social_cooldown_days: 2,
            referral_yearly_cap: 3,
        };
        assert!(policy.can_spin(Some(NOW - DAY), NOW));
        assert!(!policy.can_claim_social_activity(Some(NOW - DAY), NOW));
        assert!(policy.within_referral_yearly_cap(2));
        assert!(!policy.within_referral_yearly_cap(3));
    }

    #[test]
    fn test_referral_cap_is_strict() {
        let policy = CooldownPolicy::default();
        assert!(policy.within_referral_yearly_cap(0));
        assert!(policy.within_referral_yearly_cap(19));
        assert!(!policy.within_referral_yearly_cap(20));
        assert_eq!(policy.remaining_referrals(7), 13);
        assert_eq!(policy.remaining_referrals(25), 0);
    }

    #[test]
    fn test_calendar_year() {
        assert_eq!(calendar_year(0), 1970);
        assert_eq!(calendar_year(NOW), 2026);
        // 2024-12-31T23:59:59Z and 2025-01-01T00:00:00Z
        assert_eq!(calendar_year(1_735_689_599), 2024);
        assert_eq!(calendar_year(1_735_689_600), 2025);
        assert_eq!(calendar_year(-1), 1969);
        // beyond the representable range the year saturates
        assert!(calendar_year(i64::MAX) > 200_000);
        assert!(calendar_year(i64::MIN) < -200_000);
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(year_bounds(1970), (0, 365 * DAY));
        assert_eq!(year_bounds(2025), (1_735_689_600, 1_767_225_600));
        // leap year
        let (start, end) = year_bounds(2024);
        assert_eq!(end - start, 366 * DAY);
    }
}
