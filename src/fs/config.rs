use crate::disk::types::{BLOCK_SIZE, INDIRECT_SLOTS};

/// 每个 inode 的直接块指针数量
pub const BLOCK_INDEX_NUMBER: usize = 3;

/// inode 表容量，也是根目录中最多能存放的文件数
pub const INODE_NUMBER_LIMIT: usize = 32;

/// 一个文件最多占用的数据块数：直接块 + 一个间接块能索引的所有块
pub const MAX_DATA_BLOCKS: usize = BLOCK_INDEX_NUMBER + INDIRECT_SLOTS;

/// 单个文件能容纳的数据字节数
pub const MAX_DATA_SIZE: usize = MAX_DATA_BLOCKS * BLOCK_SIZE;

/// 单个文件在磁盘上的最大占用：数据再加上一个索引块
pub const MAX_FILE_SIZE: usize = MAX_DATA_SIZE + BLOCK_SIZE;

// realSize 用 u16 存储
const _: () = assert!(MAX_DATA_SIZE <= u16::MAX as usize);
