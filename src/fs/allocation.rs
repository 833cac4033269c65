//! 单个 inode 的块分配与回收

use log::trace;

use crate::{
    disk::{BlockDevice, BlockId, IndexTable, BLOCK_COUNT, BLOCK_SIZE, INDIRECT_SLOTS},
    fs::{
        config::BLOCK_INDEX_NUMBER,
        error::{FileSystemError, Result},
        inode_table::InodeId,
        FileSystem,
    },
    utils::Clock,
};

/// 扩容的结果
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Growth {
    /// 原有块保留，新块接在后面
    InPlace,
    /// 原有块被整体释放并重新分配，携带原来的数据
    Reallocated(Vec<u8>),
}

/// 存放 `data_len` 字节所需的数据块数
pub(crate) fn data_blocks_for(data_len: usize) -> usize {
    data_len.div_ceil(BLOCK_SIZE)
}

/// 数据块数超过直接指针数量时需要一个间接块
pub(crate) fn needs_indirect(data_blocks: usize) -> bool {
    data_blocks > BLOCK_INDEX_NUMBER
}

/// 把数据按块大小切片，最后一片可能不满
pub(crate) fn fragment(data: &[u8]) -> Vec<&[u8]> {
    data.chunks(BLOCK_SIZE).collect()
}

impl<C: Clock> FileSystem<C> {
    /// 只增不减：需要的块数多于现有时才扩容
    pub(crate) fn truncate_to(&mut self, id: InodeId, needed_blocks: usize) -> Result<Growth> {
        if needed_blocks > self.inode_table[id].data_block_count() {
            return self.grow_allocation(id, needed_blocks);
        }
        Ok(Growth::InPlace)
    }

    /// 扩容到 `needed_blocks` 个数据块
    ///
    /// 若最后一个数据块之后紧跟着足够的空闲块则原地扩展，
    /// 否则读出原数据、整体释放，再按新大小重新分配。
    pub(crate) fn grow_allocation(&mut self, id: InodeId, needed_blocks: usize) -> Result<Growth> {
        let occupied = self.inode_table[id].data_block_count();
        let delta = needed_blocks.abs_diff(occupied);

        if let Some(last) = self.inode_table[id].last_data_block(&self.disk) {
            let following: Vec<BlockId> = (last + 1..last + 1 + delta).collect();
            let contiguous = following
                .iter()
                .all(|&b| b < BLOCK_COUNT && !self.data_bitmap.is_used(b));

            if contiguous {
                trace!("inode {id}: extending after block {last} by {delta} block(s)");
                self.allocate_blocks(id, &following)?;
                return Ok(Growth::InPlace);
            }
        } else {
            let blocks = self.find_blocks_or_full(needed_blocks)?;
            self.allocate_blocks(id, &blocks)?;
            return Ok(Growth::InPlace);
        }

        trace!("inode {id}: no room after last block, reallocating {needed_blocks} block(s)");
        let existing = self.file_data(id);
        self.deallocate(id);
        let blocks = self.find_blocks_or_full(needed_blocks)?;
        self.allocate_blocks(id, &blocks)?;
        Ok(Growth::Reallocated(existing))
    }

    /// 标记块为占用并登记到 inode
    pub(crate) fn allocate_blocks(&mut self, id: InodeId, blocks: &[BlockId]) -> Result<()> {
        for &block in blocks {
            self.data_bitmap.set_occupied(block);
        }
        let inode = &mut self.inode_table[id];
        inode.blocks_occupied += blocks.len() as u8;
        self.add_indexes(id, blocks)
    }

    /// 把块号填进 inode：先填空的直接指针，剩余的写入间接块
    ///
    /// 间接块不存在时会先分配一个，它同样计入占用块数。
    pub(crate) fn add_indexes(&mut self, id: InodeId, blocks: &[BlockId]) -> Result<()> {
        let inode = &mut self.inode_table[id];
        let mut rest = blocks.iter().copied();

        for slot in inode.direct_blocks.iter_mut().filter(|slot| slot.is_none()) {
            match rest.next() {
                Some(block) => *slot = Some(block),
                None => return Ok(()),
            }
        }

        let remaining: Vec<BlockId> = rest.collect();
        if remaining.is_empty() {
            return Ok(());
        }

        let (indirect, mut indices) = match self.inode_table[id].single_indirect_block {
            Some(indirect) => (indirect, self.disk.read_indices(indirect)),
            None => {
                let indirect = *self
                    .data_bitmap
                    .find_blocks(1)
                    .first()
                    .ok_or(FileSystemError::DataTooBig)?;
                self.data_bitmap.set_occupied(indirect);

                let inode = &mut self.inode_table[id];
                inode.single_indirect_block = Some(indirect);
                inode.blocks_occupied += 1;
                trace!("inode {id}: index block {indirect} allocated");

                let empty: IndexTable = [None; INDIRECT_SLOTS];
                (indirect, empty)
            }
        };

        let mut remaining = remaining.into_iter();
        for slot in indices.iter_mut().filter(|slot| slot.is_none()) {
            match remaining.next() {
                Some(block) => *slot = Some(block),
                None => break,
            }
        }
        if remaining.next().is_some() {
            return Err(FileSystemError::DataTooBig);
        }

        self.disk.write_indices(indirect, &indices);
        Ok(())
    }

    /// 释放 inode 引用的所有块，包括间接块本身
    pub(crate) fn deallocate(&mut self, id: InodeId) {
        let inode = &mut self.inode_table[id];

        for slot in inode.direct_blocks.iter_mut() {
            if let Some(block) = slot.take() {
                self.data_bitmap.set_free(block);
            }
        }

        if let Some(indirect) = inode.single_indirect_block.take() {
            for block in self.disk.read_indices(indirect).into_iter().flatten() {
                self.data_bitmap.set_free(block);
            }
            self.data_bitmap.set_free(indirect);
        }

        inode.blocks_occupied = 0;
    }

    pub(crate) fn find_blocks_or_full(&self, n: usize) -> Result<Vec<BlockId>> {
        let blocks = self.data_bitmap.find_blocks(n);
        if blocks.len() < n {
            return Err(FileSystemError::DataTooBig);
        }
        Ok(blocks)
    }
}
