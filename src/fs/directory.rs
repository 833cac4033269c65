use std::collections::HashMap;

use crate::fs::inode_table::InodeId;

// 一个目录项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub inode_index: InodeId,
}

/// 单层根目录：文件名 -> inode 编号
///
/// 目录项保持插入顺序。重名检查由调用方负责。
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: Vec<DirEntry>,
    index_map: HashMap<String, usize>, // name -> entries 索引
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    fn rebuild_index_map(&mut self) {
        self.index_map.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            self.index_map.insert(entry.name.clone(), i);
        }
    }

    // 添加目录项
    pub fn add(&mut self, inode_index: InodeId, name: &str) {
        self.entries.push(DirEntry {
            name: name.to_string(),
            inode_index,
        });
        self.index_map.insert(name.to_string(), self.entries.len() - 1);
    }

    // 删除目录项，返回 inode_index
    pub fn remove(&mut self, name: &str) -> Option<InodeId> {
        let idx = self.index_map.get(name).copied()?;
        let entry = self.entries.remove(idx);
        self.rebuild_index_map();
        Some(entry.inode_index)
    }

    // 查找目录项，返回 inode_index
    pub fn find(&self, name: &str) -> Option<InodeId> {
        self.index_map
            .get(name)
            .map(|&idx| self.entries[idx].inode_index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_map.contains_key(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// 按插入顺序遍历目录项
    pub fn entries(&self) -> impl Iterator<Item = &DirEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index_map.clear();
    }
}
