use thiserror::Error;

/// 文件系统错误类型
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FileSystemError {
    // 文件名为空、过长，或参数非法
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // 文件大小为 0 或超过单文件上限
    #[error("Invalid file size {size} (must be between 1 and {max} bytes)")]
    InvalidSize { size: usize, max: usize },

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("File not found: {0}")]
    NotFound(String),

    // 文件表没有空闲槽位
    #[error("File table is full ({capacity} files)")]
    TableFull { capacity: usize },

    // 空闲块不足
    #[error("Not enough free blocks: requested {requested}, available {available}")]
    InsufficientSpace { requested: usize, available: usize },

    // 偏移/长度超出文件声明的大小
    #[error("Access out of bounds on '{name}': offset {offset} + {len} bytes exceeds size {size}")]
    OutOfBounds {
        name: String,
        offset: usize,
        len: usize,
        size: usize,
    },

    // 内部计数与实际占用不一致
    #[error("File system corrupted: {0}")]
    Corrupted(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// 文件系统统一结果类型
pub type Result<T> = std::result::Result<T, FileSystemError>;
