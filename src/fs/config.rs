use serde::{Deserialize, Serialize};

use crate::fs::error::{FileSystemError, Result};

/// 每个数据块的大小（字节）
pub const BLOCK_SIZE: usize = 512;

/// 存储总预算：1 MB
pub const MAX_STORAGE: usize = 1024 * 1024;

/// 数据块总数：1MB / 512B = 2048 块
pub const TOTAL_BLOCKS: usize = MAX_STORAGE / BLOCK_SIZE;

/// 文件表槽位数
pub const MAX_FILES: usize = 100;

/// 文件名最大长度（字节）
pub const MAX_FILENAME_LEN: usize = 255;

/// 单个文件的最大逻辑大小
pub const MAX_FILE_SIZE: usize = 1024 * 1024;

/// 文件系统实例的几何参数，实例创建后不再改变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsConfig {
    pub block_size: usize,
    pub total_blocks: usize,
    pub max_files: usize,
    pub max_filename_len: usize,
    pub max_file_size: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            block_size: BLOCK_SIZE,
            total_blocks: TOTAL_BLOCKS,
            max_files: MAX_FILES,
            max_filename_len: MAX_FILENAME_LEN,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

impl FsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(FileSystemError::InvalidConfig(
                "block size must be greater than zero".into(),
            ));
        }
        if self.total_blocks == 0 {
            return Err(FileSystemError::InvalidConfig(
                "block pool must hold at least one block".into(),
            ));
        }
        if self.max_files == 0 {
            return Err(FileSystemError::InvalidConfig(
                "file table must have at least one slot".into(),
            ));
        }
        if self.max_filename_len == 0 || self.max_file_size == 0 {
            return Err(FileSystemError::InvalidConfig(
                "name and file size limits must be greater than zero".into(),
            ));
        }
        if self.total_blocks.checked_mul(self.block_size).is_none() {
            return Err(FileSystemError::InvalidConfig(
                "block pool size overflows the address space".into(),
            ));
        }
        Ok(())
    }

    /// 总存储容量（字节）
    pub fn capacity_bytes(&self) -> usize {
        self.total_blocks * self.block_size
    }

    /// ceil(size / block_size)
    pub fn blocks_for(&self, size: usize) -> usize {
        size.div_ceil(self.block_size)
    }
}
