pub mod discount;
pub mod eligibility;
pub mod redemption_service;
pub mod subscriber_service;

pub use discount::*;
pub use eligibility::*;
pub use redemption_service::*;
pub use subscriber_service::*;
