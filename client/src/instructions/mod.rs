pub mod reup_instructions;
pub mod rpc;
pub mod utils;
