pub mod error;
pub mod fallback;
pub mod memory;
pub mod redb;
pub mod remote;
pub mod traits;

pub use error::KVError;
pub use fallback::FallbackStore;
pub use memory::MemoryStore;
pub use redb::RedbStore;
pub use remote::RemoteStore;
pub use traits::KVStore;
