pub mod memory;
pub mod promotion_store;
pub mod subscriber_store;

pub use memory::{MemoryPromotionStore, MemorySubscriberStore};
pub use promotion_store::{PgPromotionStore, PromotionStore};
pub use subscriber_store::{PgSubscriberStore, SubscriberStore};
