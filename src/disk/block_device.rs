use crate::disk::{
    index_codec,
    types::{Block, BlockId, IndexTable, BLOCK_SIZE},
};

/// 块设备抽象：按块读写原始字节
///
/// 调用方保证块号在范围内（块号都来自位图分配器）。
pub trait BlockDevice {
    fn read_block(&self, block_id: BlockId, buf: &mut Block);
    fn write_block(&mut self, block_id: BlockId, buf: &Block);

    /// 写入至多 `BLOCK_SIZE` 个字节，块内剩余部分清零
    fn write_bytes(&mut self, block_id: BlockId, bytes: &[u8]) {
        let len = bytes.len().min(BLOCK_SIZE);
        let mut block: Block = [0; BLOCK_SIZE];
        block[..len].copy_from_slice(&bytes[..len]);
        self.write_block(block_id, &block);
    }

    /// 把索引表编码后写入间接块
    fn write_indices(&mut self, block_id: BlockId, indices: &IndexTable) {
        self.write_block(block_id, &index_codec::encode(indices));
    }

    /// 读取整个块，跳过值为 0 的空字节
    fn read_string(&self, block_id: BlockId) -> Vec<u8> {
        let mut block: Block = [0; BLOCK_SIZE];
        self.read_block(block_id, &mut block);
        block.into_iter().filter(|&b| b != 0).collect()
    }

    /// 读取间接块并解码出索引表
    fn read_indices(&self, block_id: BlockId) -> IndexTable {
        let mut block: Block = [0; BLOCK_SIZE];
        self.read_block(block_id, &mut block);
        index_codec::decode(&block)
    }
}
