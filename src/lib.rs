//! 内存中的 inode 文件系统：固定大小的虚拟磁盘、位图分配、间接块索引，
//! 以及按 (文件, 进程) 区分的读写句柄。

pub mod disk;
pub mod fs;
pub mod utils;

pub use fs::{
    error::{FileSystemError, Result},
    file_handle::OpenMode,
    FileSystem,
};
