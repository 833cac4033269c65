use std::collections::BTreeMap;

use log::debug;

use crate::{
    disk::{VirtualDisk, BLOCK_COUNT, BLOCK_SIZE},
    fs::{
        allocation::{data_blocks_for, fragment, needs_indirect, Growth},
        config::{INODE_NUMBER_LIMIT, MAX_DATA_SIZE},
        data_block_bitmap::DataBlockBitmap,
        directory::Directory,
        error::{FileSystemError, Result},
        file_handle::{FileHandle, OpenMode},
        inode_bitmap::InodeBitmap,
        inode_table::{InodeId, InodeTable},
    },
    utils::{Clock, LocalClock},
};

mod allocation;
pub mod config;
pub mod data_block_bitmap;
pub mod directory;
pub mod error;
pub mod file_handle;
pub mod inode_bitmap;
pub mod inode_table;
pub mod query;
pub mod super_block;

/// 句柄表的键：(文件名, 进程名)
type HandleKey = (String, String);

fn handle_key(file_name: &str, proc_name: &str) -> HandleKey {
    (file_name.to_string(), proc_name.to_string())
}

/// 内存中的单目录文件系统
///
/// 所有操作先完成检查再修改状态，失败的操作不会留下任何副作用。
/// 进程只是区分句柄归属的名字，调用方负责串行调用。
#[derive(Debug)]
pub struct FileSystem<C = LocalClock> {
    disk: VirtualDisk,                          // 底层磁盘
    data_bitmap: DataBlockBitmap,               // 数据块分配信息
    inode_bitmap: InodeBitmap,                  // inode 分配信息
    inode_table: InodeTable,                    // 所有 inode
    directory: Directory,                       // 根目录
    handles: BTreeMap<HandleKey, FileHandle>,   // 打开的文件
    clock: C,
}

impl FileSystem<LocalClock> {
    pub fn new() -> Self {
        Self::with_clock(LocalClock)
    }
}

impl Default for FileSystem<LocalClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FileSystem<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            disk: VirtualDisk::new(),
            data_bitmap: DataBlockBitmap::new(BLOCK_COUNT),
            inode_bitmap: InodeBitmap::new(INODE_NUMBER_LIMIT),
            inode_table: InodeTable::new(INODE_NUMBER_LIMIT),
            directory: Directory::new(),
            handles: BTreeMap::new(),
            clock,
        }
    }

    /// 清空磁盘和所有元数据，回到刚创建时的状态
    pub fn format(&mut self) {
        self.disk.wipe();
        self.data_bitmap = DataBlockBitmap::new(BLOCK_COUNT);
        self.inode_bitmap = InodeBitmap::new(INODE_NUMBER_LIMIT);
        self.inode_table = InodeTable::new(INODE_NUMBER_LIMIT);
        self.directory.clear();
        self.handles.clear();
        debug!("file system formatted");
    }

    /// 创建文件，创建者随即以读写模式打开它
    pub fn create(&mut self, file_name: &str, proc_name: &str) -> Result<()> {
        self.check_create(file_name)
            .inspect_err(|e| debug!("create '{file_name}' by '{proc_name}' rejected: {e}"))?;

        let now = self.clock.now();
        let id = self
            .inode_table
            .alloc_inode(&mut self.inode_bitmap, now)
            .ok_or(FileSystemError::NoInodesLeft)?;
        self.directory.add(id, file_name);
        self.handles.insert(
            handle_key(file_name, proc_name),
            FileHandle::new(OpenMode::READ_WRITE),
        );
        self.inode_table[id].opened = true;

        debug!("created '{file_name}' (inode {id}) for '{proc_name}'");
        Ok(())
    }

    /// 打开文件；同一进程再次打开会替换原来的句柄
    pub fn open(&mut self, file_name: &str, proc_name: &str, mode: OpenMode) -> Result<()> {
        let id = self
            .check_exists(file_name)
            .inspect_err(|e| debug!("open '{file_name}' by '{proc_name}' rejected: {e}"))?;

        self.handles
            .insert(handle_key(file_name, proc_name), FileHandle::new(mode));
        self.inode_table[id].opened = true;

        debug!("'{proc_name}' opened '{file_name}' with {mode:?}");
        Ok(())
    }

    /// 关闭文件；最后一个句柄关闭后文件不再处于打开状态
    pub fn close(&mut self, file_name: &str, proc_name: &str) -> Result<()> {
        let id = self
            .check_exists(file_name)
            .and_then(|id| self.check_handle(file_name, proc_name).map(|_| id))
            .inspect_err(|e| debug!("close '{file_name}' by '{proc_name}' rejected: {e}"))?;

        self.handles.remove(&handle_key(file_name, proc_name));
        if self.handle_count(file_name) == 0 {
            self.inode_table[id].opened = false;
        }

        debug!("'{proc_name}' closed '{file_name}'");
        Ok(())
    }

    /// 用新数据覆盖整个文件
    pub fn write(&mut self, file_name: &str, proc_name: &str, data: impl AsRef<[u8]>) -> Result<()> {
        let data = data.as_ref();
        let id = self
            .check_write(file_name, proc_name, data.len())
            .inspect_err(|e| debug!("write '{file_name}' by '{proc_name}' rejected: {e}"))?;

        // check_write 已保证空闲块加上本文件占用的块足够，释放后的分配不会失败
        self.deallocate(id);
        if !data.is_empty() {
            let needed = data_blocks_for(data.len());
            debug_assert!(
                needed + usize::from(needs_indirect(needed)) <= self.data_bitmap.free_blocks()
            );
            let blocks = self.find_blocks_or_full(needed)?;
            self.allocate_blocks(id, &blocks)?;
            self.write_fragments(file_name, proc_name, id, &fragment(data), 0);
        }

        let now = self.clock.now();
        let inode = &mut self.inode_table[id];
        inode.real_size = data.len() as u16;
        inode.touch(now);
        self.invalidate_handles(file_name);

        debug!(
            "'{proc_name}' wrote {} byte(s) to '{file_name}' ({} block(s))",
            data.len(),
            self.inode_table[id].blocks_occupied
        );
        Ok(())
    }

    /// 在文件末尾追加数据
    ///
    /// 最后一个不满的块与新数据合并后重新写入，只分配额外需要的块。
    pub fn append(&mut self, file_name: &str, proc_name: &str, data: impl AsRef<[u8]>) -> Result<()> {
        let data = data.as_ref();
        let id = self
            .check_append(file_name, proc_name, data.len())
            .inspect_err(|e| debug!("append '{file_name}' by '{proc_name}' rejected: {e}"))?;

        if !data.is_empty() {
            let old_size = usize::from(self.inode_table[id].real_size);
            let tail = self.partial_tail(id);
            let needed = data_blocks_for(old_size + data.len());

            let (payload, start_slot) = match self.truncate_to(id, needed)? {
                Growth::InPlace => ([tail.as_slice(), data].concat(), old_size / BLOCK_SIZE),
                Growth::Reallocated(existing) => ([existing.as_slice(), data].concat(), 0),
            };
            self.write_fragments(file_name, proc_name, id, &fragment(&payload), start_slot);
            self.inode_table[id].real_size = (old_size + data.len()) as u16;
        }

        let now = self.clock.now();
        self.inode_table[id].touch(now);
        self.invalidate_handles(file_name);

        debug!(
            "'{proc_name}' appended {} byte(s) to '{file_name}', size now {}",
            data.len(),
            self.inode_table[id].real_size
        );
        Ok(())
    }

    /// 从句柄游标处读取至多 `n` 个字节
    pub fn read(&mut self, file_name: &str, proc_name: &str, n: usize) -> Result<Vec<u8>> {
        let id = self
            .check_read(file_name, proc_name)
            .inspect_err(|e| debug!("read '{file_name}' by '{proc_name}' rejected: {e}"))?;

        let handle = self
            .handles
            .get_mut(&handle_key(file_name, proc_name))
            .ok_or(FileSystemError::NotOpened)?;
        Ok(handle.read(n, &self.inode_table[id], &self.disk))
    }

    /// 从头读取文件的全部数据
    pub fn read_all(&mut self, file_name: &str, proc_name: &str) -> Result<Vec<u8>> {
        let id = self
            .check_read(file_name, proc_name)
            .inspect_err(|e| debug!("read_all '{file_name}' by '{proc_name}' rejected: {e}"))?;

        let handle = self
            .handles
            .get_mut(&handle_key(file_name, proc_name))
            .ok_or(FileSystemError::NotOpened)?;
        Ok(handle.read_all(&self.inode_table[id], &self.disk))
    }

    /// 删除文件；任何进程仍打开着它时拒绝删除
    pub fn delete(&mut self, file_name: &str, proc_name: &str) -> Result<()> {
        let id = self
            .check_exists(file_name)
            .and_then(|id| match self.handle_count(file_name) {
                0 => Ok(id),
                _ => Err(FileSystemError::Opened),
            })
            .inspect_err(|e| debug!("delete '{file_name}' by '{proc_name}' rejected: {e}"))?;

        self.deallocate(id);
        self.inode_table.free_inode(&mut self.inode_bitmap, id);
        self.directory.remove(file_name);

        debug!("'{proc_name}' deleted '{file_name}' (inode {id})");
        Ok(())
    }

    pub fn exists(&self, file_name: &str) -> bool {
        self.directory.contains(file_name)
    }

    fn check_name(file_name: &str) -> Result<()> {
        if file_name.is_empty() {
            return Err(FileSystemError::EmptyName);
        }
        Ok(())
    }

    fn check_exists(&self, file_name: &str) -> Result<InodeId> {
        Self::check_name(file_name)?;
        self.directory
            .find(file_name)
            .ok_or(FileSystemError::NotFound)
    }

    fn check_handle(&self, file_name: &str, proc_name: &str) -> Result<&FileHandle> {
        self.handles
            .get(&handle_key(file_name, proc_name))
            .ok_or(FileSystemError::NotOpened)
    }

    fn check_create(&self, file_name: &str) -> Result<()> {
        Self::check_name(file_name)?;
        if self.directory.contains(file_name) {
            return Err(FileSystemError::NameUsed);
        }
        if self.directory.len() >= INODE_NUMBER_LIMIT || self.inode_bitmap.free_inodes() == 0 {
            return Err(FileSystemError::NoInodesLeft);
        }
        Ok(())
    }

    fn check_read(&self, file_name: &str, proc_name: &str) -> Result<InodeId> {
        let id = self.check_exists(file_name)?;
        if !self.check_handle(file_name, proc_name)?.flags().contains(OpenMode::READ) {
            return Err(FileSystemError::NotRMode);
        }
        Ok(id)
    }

    fn check_writable(&self, file_name: &str, proc_name: &str, data_len: usize) -> Result<InodeId> {
        Self::check_name(file_name)?;
        if data_len > MAX_DATA_SIZE {
            return Err(FileSystemError::DataTooBig);
        }
        let id = self.check_exists(file_name)?;
        if !self.inode_table[id].opened {
            return Err(FileSystemError::NotOpened);
        }
        if !self.check_handle(file_name, proc_name)?.flags().contains(OpenMode::WRITE) {
            return Err(FileSystemError::NotWMode);
        }
        Ok(id)
    }

    /// 覆盖写：原有块会先全部释放，可用块 = 空闲块 + 文件已占用的块
    fn check_write(&self, file_name: &str, proc_name: &str, data_len: usize) -> Result<InodeId> {
        let id = self.check_writable(file_name, proc_name, data_len)?;

        let data_blocks = data_blocks_for(data_len);
        let needed = data_blocks + usize::from(needs_indirect(data_blocks));
        let available =
            self.data_bitmap.free_blocks() + usize::from(self.inode_table[id].blocks_occupied);
        if needed > available {
            return Err(FileSystemError::DataTooBig);
        }
        Ok(id)
    }

    /// 追加：只需要额外的数据块，以及第一次越过直接指针时的间接块
    fn check_append(&self, file_name: &str, proc_name: &str, data_len: usize) -> Result<InodeId> {
        let id = self.check_writable(file_name, proc_name, data_len)?;
        let inode = &self.inode_table[id];

        let new_size = usize::from(inode.real_size) + data_len;
        if new_size > MAX_DATA_SIZE {
            return Err(FileSystemError::DataTooBig);
        }

        let current = inode.data_block_count();
        let needed = data_blocks_for(new_size);
        let extra = needed.saturating_sub(current)
            + usize::from(needs_indirect(needed) && inode.single_indirect_block.is_none());
        if extra > self.data_bitmap.free_blocks() {
            return Err(FileSystemError::DataTooBig);
        }
        Ok(id)
    }

    fn handle_count(&self, file_name: &str) -> usize {
        self.handles
            .keys()
            .filter(|(name, _)| name == file_name)
            .count()
    }

    fn invalidate_handles(&mut self, file_name: &str) {
        self.handles
            .iter_mut()
            .filter(|((name, _), _)| name == file_name)
            .for_each(|(_, handle)| handle.invalidate());
    }

    fn write_fragments(
        &mut self,
        file_name: &str,
        proc_name: &str,
        id: InodeId,
        fragments: &[&[u8]],
        start_slot: usize,
    ) {
        if let Some(handle) = self.handles.get_mut(&handle_key(file_name, proc_name)) {
            handle.write(fragments, start_slot, &self.inode_table[id], &mut self.disk);
        }
    }

    /// 最后一个不满的块中已有的数据
    fn partial_tail(&self, id: InodeId) -> Vec<u8> {
        let inode = &self.inode_table[id];
        let tail_len = usize::from(inode.real_size) % BLOCK_SIZE;
        if tail_len == 0 {
            return Vec::new();
        }

        match inode.last_data_block(&self.disk) {
            Some(block) => self.disk.block(block)[..tail_len].to_vec(),
            None => Vec::new(),
        }
    }

    /// 不经过句柄读出文件的全部数据
    fn file_data(&self, id: InodeId) -> Vec<u8> {
        let inode = &self.inode_table[id];
        FileHandle::new(OpenMode::READ).read_all(inode, &self.disk)
    }
}
