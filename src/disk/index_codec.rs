//! 间接块的编码格式：
//!
//! 每个槽占 2 个字节，是一个两位、左侧补零的十进制块号（"00" ~ "99"），
//! 空槽写作字面量 "-1"。一个块共 `BLOCK_SIZE / 2` 个槽。

use crate::disk::types::{Block, BlockId, IndexTable, BLOCK_SIZE, INDIRECT_SLOTS};

const EMPTY_SLOT: &[u8; 2] = b"-1";

/// 将索引表编码为一个完整的块
pub fn encode(indices: &IndexTable) -> Block {
    let mut block: Block = [0; BLOCK_SIZE];

    for (slot, index) in block.chunks_exact_mut(2).zip(indices.iter()) {
        match index {
            Some(id) => {
                debug_assert!(*id < 100, "block index {id} does not fit two digits");
                slot[0] = b'0' + (id / 10) as u8;
                slot[1] = b'0' + (id % 10) as u8;
            }
            None => slot.copy_from_slice(EMPTY_SLOT),
        }
    }

    block
}

/// 从块内容解码索引表
///
/// 遇到第一个 0 字节即停止，剩余槽保持为空。
pub fn decode(bytes: &[u8]) -> IndexTable {
    let mut indices: IndexTable = [None; INDIRECT_SLOTS];

    for (slot, pair) in indices.iter_mut().zip(bytes.chunks_exact(2)) {
        if pair[0] == 0 || pair[1] == 0 {
            break;
        }
        *slot = parse_slot(pair);
    }

    indices
}

fn parse_slot(pair: &[u8]) -> Option<BlockId> {
    if pair == EMPTY_SLOT {
        return None;
    }

    let tens = pair[0].checked_sub(b'0').filter(|d| *d < 10)?;
    let ones = pair[1].checked_sub(b'0').filter(|d| *d < 10)?;
    Some(tens as BlockId * 10 + ones as BlockId)
}
