pub mod error;
pub mod facade;
pub mod lock;
pub mod store;
pub mod testing;

pub use error::StoreError;
pub use facade::PersistenceFacade;
pub use lock::{DistributedLock, LockGuard};
pub use store::ActionStore;
