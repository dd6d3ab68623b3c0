use anchor_lang::prelude::*;

/// Emitted whenever the admin writes a config snapshot.
#[event]
pub struct ConfigUpdated {
    pub admin: Pubkey,
    pub operator: Pubkey,
    pub prizes: u8,
    pub rewards: u8,
    pub order_bands: u8,
}

#[event]
pub struct AccountOpened {
    pub user_id: String,
    pub created_at: i64,
}

#[event]
pub struct CodeIssued {
    pub code: String,
    pub code_type: String,
    pub petals_delta: i64,
    pub spin_credit: u8,
    pub expires_at: i64,
    pub bound_user_id: Option<String>,
}

#[event]
pub struct CodeActivated {
    pub code: String,
    pub user_id: String,
    pub petals_added: i64,
    pub spin_credits_added: u8,
}

/// Mirrors every ledger entry, so indexers can follow the log as a stream.
#[event]
pub struct LedgerPosted {
    pub user_id: String,
    pub seq: u64,
    pub delta: i64,
    pub kind: String,
    pub memo: String,
    /// Balance after the entry.
    pub petals: u64,
    pub created_at: i64,
}

#[event]
pub struct RewardExchanged {
    pub user_id: String,
    pub reward_id: String,
    pub petals_cost: u64,
    pub code: String,
    pub expires_at: i64,
}

#[event]
pub struct WheelSpun {
    pub user_id: String,
    pub prize_id: String,
    pub prize_type: String,
    pub prize_value: u32,
    pub angle: f64,
}

#[event]
pub struct ReferralRegistered {
    pub inviter_id: String,
    pub invitee_id: String,
}

#[event]
pub struct ReferralBonusPaid {
    pub inviter_id: String,
    pub invitee_id: String,
    pub order_amount: u64,
    pub invitee_bonus: u64,
    pub inviter_bonus: u64,
}
