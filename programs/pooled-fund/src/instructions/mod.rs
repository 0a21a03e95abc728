pub mod configure_fund;
pub mod deposit;
pub mod initialize_fund;
pub mod initialize_registry;
pub mod manage_positions;
pub mod mint_shares;
pub mod payout_fees;
pub mod rebalance;
pub mod redeem;
pub mod report_position;
pub mod reset_high_water_mark;
pub mod set_platform_payout;
pub mod toggle_position;
pub mod transfers;
pub mod trust_position;
pub mod update_price;
pub mod withdraw;

pub use configure_fund::*;
pub use deposit::*;
pub use initialize_fund::*;
pub use initialize_registry::*;
pub use manage_positions::*;
pub use mint_shares::*;
pub use payout_fees::*;
pub use rebalance::*;
pub use redeem::*;
pub use report_position::*;
pub use reset_high_water_mark::*;
pub use set_platform_payout::*;
pub use toggle_position::*;
pub use trust_position::*;
pub use update_price::*;
pub use withdraw::*;
