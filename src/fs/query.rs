//! 只读查询接口，供外部展示层使用，不修改任何状态

use crate::{
    disk::{BlockDevice, BlockId, IndexTable, BLOCK_COUNT, BLOCK_SIZE},
    fs::{
        config::BLOCK_INDEX_NUMBER,
        error::Result,
        file_handle::OpenMode,
        inode_table::InodeId,
        super_block::SuperBlock,
        FileSystem,
    },
    utils::{Clock, Timestamp},
};

/// 单个文件的详细信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub inode_id: InodeId,
    pub real_size: usize,    // 数据字节数
    pub size_on_disk: usize, // 占用块数 * 块大小
    pub creation_time: Timestamp,
    pub modification_time: Timestamp,
    pub direct_blocks: [Option<BlockId>; BLOCK_INDEX_NUMBER],
    pub indirect_block: Option<BlockId>,
    pub indirect_entries: Option<IndexTable>,
    pub data: Vec<u8>,
}

/// 根目录的汇总信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryInfo {
    pub file_count: usize,
    pub data_size: usize,
    pub size_on_disk: usize,
}

/// 一个打开的句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleInfo<'a> {
    pub file_name: &'a str,
    pub proc_name: &'a str,
    pub mode: OpenMode,
    pub read_pos: usize,
}

impl<C: Clock> FileSystem<C> {
    pub fn super_block(&self) -> SuperBlock {
        SuperBlock::new(
            self.data_bitmap.free_blocks(),
            self.data_bitmap.free_space(),
            self.inode_bitmap.free_inodes(),
        )
    }

    pub fn free_space(&self) -> usize {
        self.data_bitmap.free_space()
    }

    pub fn file_info(&self, file_name: &str) -> Result<FileInfo> {
        let id = self.check_exists(file_name)?;
        let inode = &self.inode_table[id];

        Ok(FileInfo {
            name: file_name.to_string(),
            inode_id: id,
            real_size: usize::from(inode.real_size),
            size_on_disk: usize::from(inode.blocks_occupied) * BLOCK_SIZE,
            creation_time: inode.creation_time,
            modification_time: inode.modification_time,
            direct_blocks: inode.direct_blocks,
            indirect_block: inode.single_indirect_block,
            indirect_entries: inode
                .single_indirect_block
                .map(|block| self.disk.read_indices(block)),
            data: self.file_data(id),
        })
    }

    /// 按创建顺序列出文件名
    pub fn list_files(&self) -> Vec<&str> {
        self.directory.entries().map(|e| e.name.as_str()).collect()
    }

    pub fn directory_info(&self) -> DirectoryInfo {
        self.directory.entries().fold(
            DirectoryInfo {
                file_count: 0,
                data_size: 0,
                size_on_disk: 0,
            },
            |mut info, entry| {
                let inode = &self.inode_table[entry.inode_index];
                info.file_count += 1;
                info.data_size += usize::from(inode.real_size);
                info.size_on_disk += usize::from(inode.blocks_occupied) * BLOCK_SIZE;
                info
            },
        )
    }

    pub fn disk_bytes(&self) -> &[u8] {
        self.disk.bytes()
    }

    pub fn block_bytes(&self, block_id: BlockId) -> Option<&[u8]> {
        (block_id < BLOCK_COUNT).then(|| self.disk.block(block_id))
    }

    /// 每个块的占用状态，`true` 表示占用
    pub fn bitmap_bits(&self) -> Vec<bool> {
        self.data_bitmap.iter().collect()
    }

    /// 按 (文件名, 进程名) 排序的所有句柄
    pub fn open_handles(&self) -> Vec<HandleInfo<'_>> {
        self.handles
            .iter()
            .map(|((file_name, proc_name), handle)| HandleInfo {
                file_name,
                proc_name,
                mode: handle.flags(),
                read_pos: handle.read_pos(),
            })
            .collect()
    }

    /// 检查文件是否以写模式被某个进程打开
    pub fn is_opened_for_write(&self, file_name: &str) -> bool {
        self.handles
            .iter()
            .any(|((name, _), handle)| name == file_name && handle.flags().contains(OpenMode::WRITE))
    }

    pub fn accessing_proc_count(&self, file_name: &str) -> usize {
        self.handle_count(file_name)
    }
}
