//! In-memory collaborators for embedding and tests.

mod ban_list;
mod memory;

pub use ban_list::BanList;
pub use memory::MemoryChanCountStore;
