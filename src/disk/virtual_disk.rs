use crate::disk::{
    block_device::BlockDevice,
    types::{Block, BlockId, BLOCK_SIZE, DISK_CAPACITY},
};

/// 完全位于内存中的虚拟磁盘
#[derive(Debug, Clone)]
pub struct VirtualDisk {
    space: Box<[u8; DISK_CAPACITY]>,
}

impl VirtualDisk {
    pub fn new() -> Self {
        Self {
            space: Box::new([0; DISK_CAPACITY]),
        }
    }

    /// 整个磁盘的原始字节
    pub fn bytes(&self) -> &[u8] {
        &self.space[..]
    }

    /// 某一块的原始字节
    pub fn block(&self, block_id: BlockId) -> &[u8] {
        let start = block_id * BLOCK_SIZE;
        &self.space[start..start + BLOCK_SIZE]
    }

    // 清空磁盘
    pub fn wipe(&mut self) {
        self.space.fill(0);
    }
}

impl Default for VirtualDisk {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDevice for VirtualDisk {
    fn read_block(&self, block_id: BlockId, buf: &mut Block) {
        buf.copy_from_slice(self.block(block_id));
    }

    fn write_block(&mut self, block_id: BlockId, buf: &Block) {
        let start = block_id * BLOCK_SIZE;
        self.space[start..start + BLOCK_SIZE].copy_from_slice(buf);
    }
}
