pub mod common;
pub mod promotion_code;
pub mod redemption;
pub mod subscriber;

pub use common::*;
pub use promotion_code::*;
pub use redemption::*;
pub use subscriber::*;
