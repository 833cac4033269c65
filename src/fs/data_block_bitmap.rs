use log::trace;

use crate::disk::types::{BlockId, BLOCK_SIZE};

/// 数据块位图：每个 bit 表示一个块是否被占用（1 = 占用）
///
/// `free_space` 始终等于 `free_blocks * BLOCK_SIZE`，
/// 每次占用/释放都会同时更新位和计数。
#[derive(Debug, Clone)]
pub struct DataBlockBitmap {
    bits: Vec<u8>,        // 位图数据
    total_blocks: usize,  // 数据块总数
    free_blocks: usize,   // 当前空闲块数
    free_space: usize,    // 当前空闲字节数
}

impl DataBlockBitmap {
    pub fn new(total_blocks: usize) -> Self {
        let byte_len = total_blocks.div_ceil(8);

        Self {
            bits: vec![0; byte_len],
            total_blocks,
            free_blocks: total_blocks,
            free_space: total_blocks * BLOCK_SIZE,
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    pub fn free_blocks(&self) -> usize {
        self.free_blocks
    }

    pub fn free_space(&self) -> usize {
        self.free_space
    }

    pub fn is_used(&self, block_index: BlockId) -> bool {
        let byte_index = block_index / 8;
        let bit_index = block_index % 8;
        self.bits[byte_index] & (1 << bit_index) != 0
    }

    /// 标记块为占用
    pub fn set_occupied(&mut self, block_index: BlockId) {
        if block_index >= self.total_blocks || self.is_used(block_index) {
            return;
        }

        self.bits[block_index / 8] |= 1 << (block_index % 8);
        self.free_blocks -= 1;
        self.free_space -= BLOCK_SIZE;
    }

    /// 释放一个数据块
    pub fn set_free(&mut self, block_index: BlockId) {
        if block_index >= self.total_blocks || !self.is_used(block_index) {
            return; // 防止越界和重复释放
        }

        self.bits[block_index / 8] &= !(1 << (block_index % 8));
        self.free_blocks += 1;
        self.free_space += BLOCK_SIZE;
    }

    /// 按块号顺序返回每个块的占用状态
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.total_blocks).map(|i| self.is_used(i))
    }

    /// 最佳适应：在所有长度 >= n 的连续空闲段中选最短的一段，
    /// 长度相同时取最先扫描到的，返回该段的前 n 个块号。
    pub fn find_best_fit(&self, n: usize) -> Vec<BlockId> {
        if n == 0 {
            return Vec::new();
        }

        let mut best: Option<(BlockId, usize)> = None;
        let mut run_start = 0;
        let mut run_len = 0;

        for i in 0..=self.total_blocks {
            if i < self.total_blocks && !self.is_used(i) {
                if run_len == 0 {
                    run_start = i;
                }
                run_len += 1;
                continue;
            }

            if run_len >= n && best.map_or(true, |(_, len)| run_len < len) {
                best = Some((run_start, run_len));
                if run_len == n {
                    break;
                }
            }
            run_len = 0;
        }

        match best {
            Some((start, len)) => {
                trace!("best fit for {n} block(s): run of {len} at block {start}");
                (start..start + n).collect()
            }
            None => Vec::new(),
        }
    }

    /// 碎片分配：从左到右收集任意 n 个空闲块，不要求连续
    ///
    /// 空闲块不足 n 个时返回空。
    pub fn find_fragmented(&self, n: usize) -> Vec<BlockId> {
        let blocks: Vec<BlockId> = (0..self.total_blocks)
            .filter(|&i| !self.is_used(i))
            .take(n)
            .collect();

        if blocks.len() < n {
            return Vec::new();
        }
        blocks
    }

    /// 先尝试最佳适应，失败时退化为碎片分配
    pub fn find_blocks(&self, n: usize) -> Vec<BlockId> {
        let blocks = self.find_best_fit(n);
        if !blocks.is_empty() || n == 0 {
            return blocks;
        }

        trace!("no contiguous run of {n} block(s), falling back to fragmented allocation");
        self.find_fragmented(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap_with(total: usize, used: &[BlockId]) -> DataBlockBitmap {
        let mut bitmap = DataBlockBitmap::new(total);
        for &b in used {
            bitmap.set_occupied(b);
        }
        bitmap
    }

    fn assert_conserved(bitmap: &DataBlockBitmap) {
        let free = bitmap.iter().filter(|used| !used).count();
        let used = bitmap.iter().filter(|used| *used).count();
        assert_eq!(bitmap.free_blocks(), free);
        assert_eq!(bitmap.free_space(), free * BLOCK_SIZE);
        assert_eq!(free + used, bitmap.total_blocks());
    }

    #[test]
    fn occupy_and_free_one_block() {
        let mut bitmap = DataBlockBitmap::new(32);

        bitmap.set_occupied(0);
        assert!(bitmap.is_used(0));
        assert_eq!(bitmap.free_space(), 31 * BLOCK_SIZE);

        bitmap.set_free(0);
        assert!(!bitmap.is_used(0));
        assert_eq!(bitmap.free_space(), 32 * BLOCK_SIZE);
        assert_conserved(&bitmap);
    }

    #[test]
    fn double_occupy_and_double_free_are_ignored() {
        let mut bitmap = DataBlockBitmap::new(16);

        bitmap.set_occupied(4);
        bitmap.set_occupied(4);
        assert_eq!(bitmap.free_blocks(), 15);

        bitmap.set_free(4);
        bitmap.set_free(4);
        bitmap.set_free(100);
        assert_eq!(bitmap.free_blocks(), 16);
        assert_conserved(&bitmap);
    }

    #[test]
    fn best_fit_picks_smallest_sufficient_run() {
        // 空闲段：[0..4) 长度 4，[5..7) 长度 2，[8..11) 长度 3，[12..16) 长度 4
        let bitmap = bitmap_with(16, &[4, 7, 11]);

        assert_eq!(bitmap.find_best_fit(3), vec![8, 9, 10]);
        assert_eq!(bitmap.find_best_fit(2), vec![5, 6]);
        assert_eq!(bitmap.find_best_fit(1), vec![5]);
    }

    #[test]
    fn best_fit_tie_takes_first_run() {
        let bitmap = bitmap_with(12, &[3, 4, 8]);
        // [0..3) 与 [5..8) 都是长度 3
        assert_eq!(bitmap.find_best_fit(2), vec![0, 1]);
    }

    #[test]
    fn best_fit_considers_run_at_end_of_disk() {
        let bitmap = bitmap_with(8, &[0, 1, 2, 3, 4, 5]);
        assert_eq!(bitmap.find_best_fit(2), vec![6, 7]);
        assert!(bitmap.find_best_fit(3).is_empty());
    }

    #[test]
    fn fragmented_collects_scattered_blocks() {
        let bitmap = bitmap_with(8, &[1, 3, 5, 7]);
        assert_eq!(bitmap.find_fragmented(3), vec![0, 2, 4]);
        assert!(bitmap.find_fragmented(5).is_empty());
    }

    #[test]
    fn find_blocks_falls_back_to_fragmented() {
        let bitmap = bitmap_with(8, &[1, 3, 5, 7]);
        assert!(bitmap.find_best_fit(2).is_empty());
        assert_eq!(bitmap.find_blocks(2), vec![0, 2]);
        assert_eq!(bitmap.find_blocks(4), vec![0, 2, 4, 6]);
        assert!(bitmap.find_blocks(5).is_empty());
    }

    #[test]
    fn zero_blocks_request_is_empty() {
        let bitmap = DataBlockBitmap::new(8);
        assert!(bitmap.find_blocks(0).is_empty());
    }

    #[test]
    fn counters_stay_consistent_under_churn() {
        let mut bitmap = DataBlockBitmap::new(32);
        for round in 0..8usize {
            for b in (round..32).step_by(round + 2) {
                bitmap.set_occupied(b);
            }
            assert_conserved(&bitmap);
            for b in (0..32).step_by(round + 3) {
                bitmap.set_free(b);
            }
            assert_conserved(&bitmap);
        }
    }
}
