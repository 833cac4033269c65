pub mod block_device;
pub mod index_codec;
pub mod types;
pub mod virtual_disk;

pub use block_device::BlockDevice;
pub use types::{Block, BlockId, IndexTable, BLOCK_COUNT, BLOCK_SIZE, DISK_CAPACITY, INDIRECT_SLOTS};
pub use virtual_disk::VirtualDisk;
