/// Seconds in one day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// The seed of the config account PDA.
pub const CONFIG_SEED: &[u8] = b"config";

/// The seed of the user profile account PDA.
pub const USER_SEED: &[u8] = b"user";

/// The seed of the balance account PDA.
pub const BALANCE_SEED: &[u8] = b"balance";

/// The seed of a ledger entry PDA: `[ENTRY_SEED, user_id, seq_le]`.
pub const ENTRY_SEED: &[u8] = b"entry";

/// The seed of a redemption code PDA: `[CODE_SEED, code]`.
pub const CODE_SEED: &[u8] = b"code";

/// The seed of a referral PDA, keyed by invitee.
pub const REFERRAL_SEED: &[u8] = b"referral";

/// The seed of the per-inviter referral aggregate PDA.
pub const REFERRER_SEED: &[u8] = b"referrer";

// Field caps (bytes). PDA seeds are limited to 32 bytes each.
pub const MAX_USER_ID_LEN: usize = 32;
pub const MAX_PROFILE_FIELD_LEN: usize = 32;
pub const MAX_CODE_LEN: usize = 16;
pub const MAX_MEMO_LEN: usize = 128;
pub const MAX_PRIZE_ID_LEN: usize = 16;
pub const MAX_PRIZE_LABEL_LEN: usize = 32;
pub const MAX_COLOR_LEN: usize = 9;
pub const MAX_REWARD_ID_LEN: usize = 16;
pub const MAX_REWARD_NAME_LEN: usize = 32;

// Table caps. The prize table must fit in instruction return data (1024 bytes).
pub const MAX_PRIZES: usize = 12;
pub const MAX_REWARDS: usize = 8;
pub const MAX_ORDER_BANDS: usize = 8;

/// Alphabet for the random body of a redemption code.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated code without its checksum (prefix + random body).
pub const CODE_BODY_LEN: usize = 10;

pub const ORDER_CODE_PREFIX: &str = "OR";
pub const SOCIAL_CODE_PREFIX: &str = "SC";
pub const REWARD_CODE_PREFIX: &str = "RW";

/// Default lifetime of ORDER and SOCIAL codes.
pub const DEFAULT_CODE_TTL_DAYS: u16 = 14;

/// Lifetime of REWARD codes minted by a catalogue exchange.
pub const REWARD_CODE_TTL_DAYS: u16 = 30;

/// Spin credits never exceed this ceiling.
pub const MAX_SPIN_CREDITS: u8 = 1;

pub const DEFAULT_SPIN_COOLDOWN_DAYS: u16 = 14;
pub const DEFAULT_SOCIAL_COOLDOWN_DAYS: u16 = 30;
pub const DEFAULT_REFERRAL_YEARLY_CAP: u32 = 20;

/// Minimum first-order amount that matures a referral (currency units).
pub const DEFAULT_REFERRAL_MIN_ORDER: u64 = 2_000;
pub const DEFAULT_INVITEE_BONUS: u64 = 6;
pub const DEFAULT_INVITER_BONUS: u64 = 3;

/// Most recent referral rows returned by a list query.
pub const REFERRAL_LIST_LIMIT: usize = 50;

/// Default page size for ledger history.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Share of a wheel sector the presentation jitter may cover.
pub const WHEEL_JITTER_SHARE: f64 = 0.8;

/// The wheel always makes between MIN and MIN + SPAN - 1 full turns.
pub const WHEEL_MIN_ROTATIONS: u64 = 2;
pub const WHEEL_ROTATION_SPAN: u64 = 3;
