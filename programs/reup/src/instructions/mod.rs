pub mod initialise_config;
pub use initialise_config::*;

pub mod update_config;
pub use update_config::*;

pub mod claim_ownership;
pub use claim_ownership::*;

pub mod upgrade;
pub use upgrade::*;

pub mod stablecoins;
pub use stablecoins::*;

pub mod mint_reusd;
pub use mint_reusd::*;

pub mod exit_queue;
pub use exit_queue::*;

pub mod self_staking;
pub use self_staking::*;

pub mod rewards;
pub use rewards::*;

pub mod bridge;
pub use bridge::*;

pub mod blargitrage;
pub use blargitrage::*;

pub mod zap;
pub use zap::*;
