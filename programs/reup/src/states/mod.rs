pub mod events;
pub use events::*;

pub mod version;
pub use version::*;

pub mod global_config;
pub use global_config::*;

pub mod registry;
pub use registry::*;

pub mod exit_queue;
pub use exit_queue::*;

pub mod self_staking;
pub use self_staking::*;

pub mod bridge;
pub use bridge::*;

pub mod blargitrage;
pub use blargitrage::*;
