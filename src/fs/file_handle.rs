use bitflags::bitflags;

use crate::{
    disk::{BlockDevice, BLOCK_SIZE},
    fs::inode_table::Inode,
};

bitflags! {
    /// 打开文件时指定的访问模式
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenMode: u8 {
        const READ = 0b01;
        const WRITE = 0b10;
        const READ_WRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

/// 某个进程打开某个文件后得到的读写游标
///
/// 句柄本身不持有 inode，磁盘和 inode 在每次调用时由文件系统传入。
#[derive(Debug, Clone)]
pub struct FileHandle {
    mode: OpenMode,
    read_pos: usize,
    buffer: Vec<u8>,            // 最近读取的一个块
    buffered_slot: Option<usize>, // buffer 对应的逻辑块序号
}

impl FileHandle {
    pub fn new(mode: OpenMode) -> Self {
        Self {
            mode,
            read_pos: 0,
            buffer: Vec::with_capacity(BLOCK_SIZE),
            buffered_slot: None,
        }
    }

    /// 打开时确定的读写权限
    pub fn flags(&self) -> OpenMode {
        self.mode
    }

    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    pub fn reset_read_pos(&mut self) {
        self.read_pos = 0;
    }

    /// 丢弃缓冲的块，下次读取时重新从磁盘加载
    pub fn invalidate(&mut self) {
        self.buffer.clear();
        self.buffered_slot = None;
    }

    /// 从游标位置读取至多 `n` 个字节并前移游标
    ///
    /// 到达 `real_size` 时提前结束。
    pub fn read(&mut self, n: usize, inode: &Inode, disk: &impl BlockDevice) -> Vec<u8> {
        let real_size = usize::from(inode.real_size);
        let blocks = inode.data_blocks(disk);
        let mut out = Vec::with_capacity(n.min(real_size.saturating_sub(self.read_pos)));

        while out.len() < n && self.read_pos < real_size {
            let slot = self.read_pos / BLOCK_SIZE;
            if self.buffered_slot != Some(slot) {
                let Some(&block) = blocks.get(slot) else {
                    break;
                };
                self.buffer = disk.read_string(block);
                self.buffered_slot = Some(slot);
            }

            let Some(&byte) = self.buffer.get(self.read_pos % BLOCK_SIZE) else {
                break;
            };
            out.push(byte);
            self.read_pos += 1;
        }

        out
    }

    /// 从头读取全部数据
    pub fn read_all(&mut self, inode: &Inode, disk: &impl BlockDevice) -> Vec<u8> {
        self.reset_read_pos();
        self.read(usize::from(inode.real_size), inode, disk)
    }

    /// 将每个片段写入一个数据块，从第 `start_slot` 个逻辑块开始
    ///
    /// 返回实际写入的片段数；遇到未分配的槽时停止。
    pub fn write<F: AsRef<[u8]>>(
        &mut self,
        fragments: &[F],
        start_slot: usize,
        inode: &Inode,
        disk: &mut impl BlockDevice,
    ) -> usize {
        let blocks = inode.data_blocks(&*disk);
        let mut written = 0;

        for (fragment, slot) in fragments.iter().zip(start_slot..) {
            let Some(&block) = blocks.get(slot) else {
                break;
            };
            disk.write_bytes(block, fragment.as_ref());
            written += 1;
        }

        self.invalidate();
        written
    }
}
