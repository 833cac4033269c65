use crate::{
    disk::types::{BLOCK_COUNT, BLOCK_SIZE, DISK_CAPACITY, INDIRECT_SLOTS},
    fs::config::{BLOCK_INDEX_NUMBER, INODE_NUMBER_LIMIT, MAX_DATA_SIZE, MAX_FILE_SIZE},
};

/// 文件系统总体信息：固定参数 + 当前使用情况
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperBlock {
    pub fs_type: &'static str, // 文件系统标识
    /** 数据块信息 */
    pub disk_capacity: usize, // 磁盘容量（字节）
    pub block_size: usize,    // 每块大小（字节）
    pub total_blocks: usize,  // 总块数
    pub free_blocks: usize,   // 当前空闲块数
    pub free_space: usize,    // 当前空闲字节数
    /** 文件信息 */
    pub max_file_size: usize,      // 单文件最大磁盘占用
    pub max_data_size: usize,      // 单文件最大数据量
    pub direct_blocks: usize,      // 直接块指针数量
    pub indirect_slots: usize,     // 间接块中的索引数量
    /** inode 信息 */
    pub total_inodes: usize, // 总 inode 数
    pub free_inodes: usize,  // 当前空闲 inode 数
}

impl SuperBlock {
    pub(crate) fn new(free_blocks: usize, free_space: usize, free_inodes: usize) -> Self {
        Self {
            fs_type: "MiNiFS",
            disk_capacity: DISK_CAPACITY,
            block_size: BLOCK_SIZE,
            total_blocks: BLOCK_COUNT,
            free_blocks,
            free_space,
            max_file_size: MAX_FILE_SIZE,
            max_data_size: MAX_DATA_SIZE,
            direct_blocks: BLOCK_INDEX_NUMBER,
            indirect_slots: INDIRECT_SLOTS,
            total_inodes: INODE_NUMBER_LIMIT,
            free_inodes,
        }
    }

    pub fn used_blocks(&self) -> usize {
        self.total_blocks - self.free_blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_super_block_reports_fixed_parameters() {
        let sb = SuperBlock::new(BLOCK_COUNT, DISK_CAPACITY, INODE_NUMBER_LIMIT);
        assert_eq!(sb.block_size, 32);
        assert_eq!(sb.max_data_size, 608);
        assert_eq!(sb.max_file_size, 640);
        assert_eq!(sb.used_blocks(), 0);
    }
}
