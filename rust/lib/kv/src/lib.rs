pub mod error;
pub mod file_loader;
pub mod memory;
pub mod redb_store;
pub mod traits;

pub use error::KVError;
pub use file_loader::FileLoader;
pub use memory::MemoryKV;
pub use redb_store::RedbStore;
pub use traits::{cancelled, KVStore, Predicate};
