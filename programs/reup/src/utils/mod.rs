pub mod math;
pub use math::*;

pub mod signature;
pub use signature::*;

pub mod stable_pool;
pub use stable_pool::*;

pub mod token;
pub use token::*;

pub mod time;
pub use time::*;
