/// 每个逻辑块（Block）的大小：32 字节
/// 文件系统以“块”为最小读写单位。
pub const BLOCK_SIZE: usize = 32;

/// 虚拟磁盘总大小（单位：字节）
pub const DISK_CAPACITY: usize = 1024;

/// 磁盘中包含的块总数：1024B / 32B = 32 块
pub const BLOCK_COUNT: usize = DISK_CAPACITY / BLOCK_SIZE;

/// 一个间接块能容纳的索引数量，每个索引占 2 个字符
pub const INDIRECT_SLOTS: usize = BLOCK_SIZE / 2;

/// 定义一个逻辑块类型（每块 32 字节的字节数组）
/// 所有磁盘读写都以 Block 为单位进行。
pub type Block = [u8; BLOCK_SIZE];

/// 块号，范围 [0, BLOCK_COUNT)
pub type BlockId = usize;

/// 间接块解码后的索引表，`None` 表示空槽
pub type IndexTable = [Option<BlockId>; INDIRECT_SLOTS];

// 间接块里的索引以两位十进制数保存
const _: () = assert!(BLOCK_COUNT <= 100);
const _: () = assert!(DISK_CAPACITY % BLOCK_SIZE == 0);
