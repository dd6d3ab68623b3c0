pub use initialize_config::*;
pub mod initialize_config;

pub use update_config::*;
pub mod update_config;

pub use open_account::*;
pub mod open_account;

pub use issue_code::*;
pub mod issue_code;

pub use issue_order_code::*;
pub mod issue_order_code;

pub use activate_code::*;
pub mod activate_code;

pub use exchange_reward::*;
pub mod exchange_reward;

pub use adjust_balance::*;
pub mod adjust_balance;

pub use spin_wheel::*;
pub mod spin_wheel;

pub use wheel_configuration::*;
pub mod wheel_configuration;

pub use process_referral::*;
pub mod process_referral;

pub use confirm_first_order::*;
pub mod confirm_first_order;

pub use referral_stats::*;
pub mod referral_stats;

pub use account_status::*;
pub mod account_status;
