pub mod file_store;
pub mod memory_store;
pub mod storage;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use storage::{
    load_json, save_json, KeyValueStore, SharedStore, ATTENDANCE_KEY, AUTH_KEY, MEMBERS_KEY,
};
