use thiserror::Error;

/// 文件系统错误类型
///
/// 每个操作在修改任何状态之前完成全部检查，
/// 返回错误时文件系统状态保持不变。
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSystemError {
    #[error("file name is empty")]
    EmptyName, // 文件名为空
    #[error("file name is already in use")]
    NameUsed, // 文件名已存在
    #[error("no free inode available")]
    NoInodesLeft, // inode 已满
    #[error("data does not fit in the file or on the disk")]
    DataTooBig, // 数据超过单文件上限或磁盘剩余空间
    #[error("file not found")]
    NotFound, // 文件不存在
    #[error("file is not opened by this process")]
    NotOpened, // 当前进程没有打开该文件
    #[error("file is still opened")]
    Opened, // 文件仍被打开，不能删除
    #[error("file is not opened in read mode")]
    NotRMode, // 没有读权限
    #[error("file is not opened in write mode")]
    NotWMode, // 没有写权限
}

impl FileSystemError {
    /// 错误码，0 表示成功，8 保留未用
    pub fn code(self) -> u8 {
        match self {
            Self::EmptyName => 1,
            Self::NameUsed => 2,
            Self::NoInodesLeft => 3,
            Self::DataTooBig => 4,
            Self::NotFound => 5,
            Self::NotOpened => 6,
            Self::Opened => 7,
            Self::NotRMode => 9,
            Self::NotWMode => 10,
        }
    }
}

/// 文件系统统一结果类型
pub type Result<T> = std::result::Result<T, FileSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_skip_reserved_value() {
        let all = [
            FileSystemError::EmptyName,
            FileSystemError::NameUsed,
            FileSystemError::NoInodesLeft,
            FileSystemError::DataTooBig,
            FileSystemError::NotFound,
            FileSystemError::NotOpened,
            FileSystemError::Opened,
            FileSystemError::NotRMode,
            FileSystemError::NotWMode,
        ];
        let codes: Vec<u8> = all.iter().map(|e| e.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7, 9, 10]);
    }
}
