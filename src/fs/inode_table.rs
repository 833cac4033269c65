use std::ops::{Index, IndexMut};

use crate::{
    disk::{BlockDevice, BlockId},
    fs::{config::BLOCK_INDEX_NUMBER, inode_bitmap::InodeBitmap},
    utils::Timestamp,
};

/// inode 编号，即在 inode 表中的下标
pub type InodeId = usize;

/// 描述一个文件的大小与块布局
#[derive(Debug, Default, Clone)]
pub struct Inode {
    pub blocks_occupied: u8, // 占用的块数（含间接块本身）
    pub real_size: u16,      // 数据实际字节数
    pub creation_time: Timestamp,
    pub modification_time: Timestamp,
    pub opened: bool, // 是否有进程持有该文件的句柄

    // 块索引区
    pub direct_blocks: [Option<BlockId>; BLOCK_INDEX_NUMBER], // 直接块指针
    pub single_indirect_block: Option<BlockId>,               // 一级间接块
}

impl Inode {
    pub fn new(now: Timestamp) -> Self {
        Self {
            creation_time: now,
            modification_time: now,
            ..Self::default()
        }
    }

    /// 重置所有字段
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // 更新修改时间
    pub fn touch(&mut self, now: Timestamp) {
        self.modification_time = now;
    }

    /// 数据块数量，不含间接块本身
    pub fn data_block_count(&self) -> usize {
        let indirect = usize::from(self.single_indirect_block.is_some());
        usize::from(self.blocks_occupied).saturating_sub(indirect)
    }

    /// 按逻辑顺序列出所有数据块：先直接块，再间接块中的索引
    pub fn data_blocks(&self, disk: &impl BlockDevice) -> Vec<BlockId> {
        let mut blocks: Vec<BlockId> = self.direct_blocks.iter().flatten().copied().collect();

        if let Some(indirect) = self.single_indirect_block {
            blocks.extend(disk.read_indices(indirect).into_iter().flatten());
        }
        blocks
    }

    /// 逻辑上最后一个数据块
    pub fn last_data_block(&self, disk: &impl BlockDevice) -> Option<BlockId> {
        self.data_blocks(disk).last().copied()
    }
}

/// 固定容量的 inode 表
#[derive(Debug, Clone)]
pub struct InodeTable {
    inodes: Vec<Inode>,
}

impl InodeTable {
    pub fn new(total_inodes: usize) -> Self {
        Self {
            inodes: vec![Inode::default(); total_inodes],
        }
    }

    /// 分配编号最小的空闲 inode 并初始化时间戳
    pub fn alloc_inode(&mut self, inode_bitmap: &mut InodeBitmap, now: Timestamp) -> Option<InodeId> {
        let index = inode_bitmap.alloc()?;
        self.inodes[index] = Inode::new(now);
        Some(index)
    }

    pub fn free_inode(&mut self, inode_bitmap: &mut InodeBitmap, inode_index: InodeId) {
        if let Some(inode) = self.inodes.get_mut(inode_index) {
            inode.clear();
        }
        inode_bitmap.free(inode_index);
    }

}

// 目录中登记的编号总是有效的，直接按下标访问
impl Index<InodeId> for InodeTable {
    type Output = Inode;

    fn index(&self, index: InodeId) -> &Inode {
        &self.inodes[index]
    }
}

impl IndexMut<InodeId> for InodeTable {
    fn index_mut(&mut self, index: InodeId) -> &mut Inode {
        &mut self.inodes[index]
    }
}
