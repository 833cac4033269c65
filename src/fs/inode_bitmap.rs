use crate::fs::inode_table::InodeId;

/// inode 占用位图，每个 bit 表示一个 inode 编号是否已分配
#[derive(Debug, Clone)]
pub struct InodeBitmap {
    bits: Vec<u8>,        // 位图数据
    total_inodes: usize,  // inode 总数
    free_inodes: usize,   // 当前空闲 inode 数
}

impl InodeBitmap {
    // 创建一个新的 inode 位图（所有位清零 = 空闲）
    pub fn new(total_inodes: usize) -> Self {
        Self {
            bits: vec![0; total_inodes.div_ceil(8)],
            total_inodes,
            free_inodes: total_inodes,
        }
    }

    /// 分配编号最小的空闲 inode
    ///
    /// 被释放的编号会被优先复用。
    pub fn alloc(&mut self) -> Option<InodeId> {
        let inode_index = (0..self.total_inodes).find(|&i| !self.is_used(i))?;
        self.bits[inode_index / 8] |= 1 << (inode_index % 8);
        self.free_inodes -= 1;
        Some(inode_index)
    }

    // 释放一个 inode
    pub fn free(&mut self, inode_index: InodeId) {
        if inode_index >= self.total_inodes || !self.is_used(inode_index) {
            return;
        }

        self.bits[inode_index / 8] &= !(1 << (inode_index % 8));
        self.free_inodes += 1;
    }

    // 检查 inode 是否被占用
    pub fn is_used(&self, inode_index: InodeId) -> bool {
        (self.bits[inode_index / 8] & (1 << (inode_index % 8))) != 0
    }

    pub fn free_inodes(&self) -> usize {
        self.free_inodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_in_order_until_full() {
        let mut bitmap = InodeBitmap::new(10);
        for expected in 0..10 {
            assert_eq!(bitmap.alloc(), Some(expected));
        }
        assert_eq!(bitmap.alloc(), None);
        assert_eq!(bitmap.free_inodes(), 0);
    }

    #[test]
    fn freed_id_is_recycled_first() {
        let mut bitmap = InodeBitmap::new(8);
        for _ in 0..5 {
            bitmap.alloc();
        }

        bitmap.free(2);
        bitmap.free(4);
        assert_eq!(bitmap.free_inodes(), 5);

        assert_eq!(bitmap.alloc(), Some(2));
        assert_eq!(bitmap.alloc(), Some(4));
        assert_eq!(bitmap.alloc(), Some(5));
    }
}
