use std::collections::HashSet;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info};

use crate::fs::{
    block_store::{BlockIndex, BlockStore},
    config::FsConfig,
    error::{FileSystemError, Result},
    file_table::{FileEntry, FileTable},
};

pub mod block_store;
pub mod config;
pub mod data_area;
pub mod data_block_bitmap;
pub mod error;
pub mod file_table;

/// 内存块文件系统：块池 + 扁平文件表
///
/// 文件从 `create` 到 `delete` 之间拥有固定的块列表，
/// `write` / `read` 只访问这些块内的字节。
#[derive(Debug, Clone)]
pub struct FileSystem {
    config: FsConfig,
    blocks: BlockStore, // 块池与占用位图
    table: FileTable,   // 文件表
    total_bytes: usize, // 在用文件逻辑大小之和
}

// create 成功的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedFile {
    pub name: String,
    pub size: usize,
    pub blocks: Vec<BlockIndex>,
}

// delete 成功的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedFile {
    pub name: String,
    pub size: usize,
    pub freed_blocks: Vec<BlockIndex>,
}

/// `read` 读到的数据，以及调用方请求的长度
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    pub data: Vec<u8>,
    pub requested: usize,
}

impl ReadOutcome {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // 读到文件末尾被截断时为 true
    pub fn is_truncated(&self) -> bool {
        self.data.len() < self.requested
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FsStats {
    pub file_count: usize,
    pub total_bytes: usize,
    pub used_blocks: usize,
    pub total_blocks: usize,
    pub block_size: usize,
    pub max_files: usize,
}

impl FsStats {
    pub fn free_blocks(&self) -> usize {
        self.total_blocks - self.used_blocks
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub entries: Vec<FileSummary>,
    pub stats: FsStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub size: usize,
    pub blocks: Vec<BlockIndex>,
    pub created_at: DateTime<Local>,
    pub modified_at: DateTime<Local>,
}

impl From<&FileEntry> for FileInfo {
    fn from(entry: &FileEntry) -> Self {
        Self {
            name: entry.name.clone(),
            size: entry.size,
            blocks: entry.blocks.clone(),
            created_at: entry.created_at,
            modified_at: entry.modified_at,
        }
    }
}

impl FileSystem {
    pub fn new(config: FsConfig) -> Result<Self> {
        config.validate()?;
        info!(
            block_size = config.block_size,
            total_blocks = config.total_blocks,
            max_files = config.max_files,
            "file system initialized"
        );
        Ok(Self {
            config,
            blocks: BlockStore::new(config.block_size, config.total_blocks),
            table: FileTable::new(config.max_files),
            total_bytes: 0,
        })
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    fn validate_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(FileSystemError::InvalidArgument(
                "file name must not be empty".into(),
            ));
        }
        if name.len() > self.config.max_filename_len {
            return Err(FileSystemError::InvalidArgument(format!(
                "file name exceeds {} bytes",
                self.config.max_filename_len
            )));
        }
        Ok(())
    }

    // 创建固定大小的文件，预留 ceil(size / block_size) 个块
    pub fn create(&mut self, name: &str, size: usize) -> Result<CreatedFile> {
        self.validate_name(name)?;
        if self.table.contains(name) {
            return Err(FileSystemError::AlreadyExists(name.to_string()));
        }
        if size == 0 || size > self.config.max_file_size {
            return Err(FileSystemError::InvalidSize {
                size,
                max: self.config.max_file_size,
            });
        }

        let block_count = self.config.blocks_for(size);
        let slot = self.table.reserve_slot()?;
        let blocks = self.blocks.allocate(block_count)?;

        if let Err(e) = self
            .table
            .occupy(slot, FileEntry::new(name, size, blocks.clone()))
        {
            self.blocks.free(&blocks);
            return Err(e);
        }
        self.total_bytes += size;

        debug!(name, size, ?blocks, slot, "created file");
        Ok(CreatedFile {
            name: name.to_string(),
            size,
            blocks,
        })
    }

    /// 从 `offset` 写入 `data`；范围必须落在声明大小之内，文件不会增长
    pub fn write(&mut self, name: &str, offset: usize, data: &[u8]) -> Result<usize> {
        let block_size = self.config.block_size;
        let entry = self.table.find_mut(name)?;

        let end = offset.checked_add(data.len());
        if offset > entry.size || end.map_or(true, |end| end > entry.size) {
            return Err(FileSystemError::OutOfBounds {
                name: name.to_string(),
                offset,
                len: data.len(),
                size: entry.size,
            });
        }

        let mut written = 0;
        let mut pos = offset % block_size;
        for &block in entry.blocks.iter().skip(offset / block_size) {
            if written == data.len() {
                break;
            }
            written += self.blocks.write_at(block, pos, &data[written..]);
            pos = 0;
        }
        entry.touch();

        debug!(name, offset, written, "wrote file");
        Ok(written)
    }

    /// 从 `offset` 读取至多 `length` 字节，超出文件末尾时截断，见 [`ReadOutcome::is_truncated`]
    pub fn read(&self, name: &str, offset: usize, length: usize) -> Result<ReadOutcome> {
        if length == 0 {
            return Err(FileSystemError::InvalidArgument(
                "read length must be greater than zero".into(),
            ));
        }
        let entry = self.table.find(name)?;
        if offset >= entry.size {
            return Err(FileSystemError::OutOfBounds {
                name: name.to_string(),
                offset,
                len: length,
                size: entry.size,
            });
        }

        let block_size = self.config.block_size;
        let actual = length.min(entry.size - offset);
        let mut data = vec![0u8; actual];

        let mut filled = 0;
        let mut pos = offset % block_size;
        for &block in entry.blocks.iter().skip(offset / block_size) {
            if filled == actual {
                break;
            }
            filled += self.blocks.read_at(block, pos, &mut data[filled..]);
            pos = 0;
        }
        data.truncate(filled);

        debug!(name, offset, requested = length, read = filled, "read file");
        Ok(ReadOutcome {
            data,
            requested: length,
        })
    }

    // 删除文件，块清零后归还块池
    pub fn delete(&mut self, name: &str) -> Result<DeletedFile> {
        let slot = self.table.slot_of(name)?;
        let entry = self
            .table
            .release_slot(slot)
            .ok_or_else(|| FileSystemError::NotFound(name.to_string()))?;

        self.blocks.free(&entry.blocks);
        self.total_bytes -= entry.size;

        debug!(name, freed = entry.blocks.len(), "deleted file");
        Ok(DeletedFile {
            name: entry.name,
            size: entry.size,
            freed_blocks: entry.blocks,
        })
    }

    pub fn stats(&self) -> FsStats {
        FsStats {
            file_count: self.table.len(),
            total_bytes: self.total_bytes,
            used_blocks: self.blocks.used_blocks(),
            total_blocks: self.blocks.total_blocks(),
            block_size: self.config.block_size,
            max_files: self.table.capacity(),
        }
    }

    // 在用文件（表顺序）+ 汇总计数
    pub fn list(&self) -> Listing {
        let entries = self
            .table
            .entries()
            .map(|entry| FileSummary {
                name: entry.name.clone(),
                size: entry.size,
            })
            .collect();
        Listing {
            entries,
            stats: self.stats(),
        }
    }

    pub fn stat(&self, name: &str) -> Result<FileInfo> {
        self.table.find(name).map(FileInfo::from)
    }

    // 交叉校验位图、计数器与文件表
    pub fn check(&self) -> Result<()> {
        let used = self.blocks.used_blocks();
        let counted = self.blocks.count_used();
        if used != counted {
            return Err(FileSystemError::Corrupted(format!(
                "used block counter is {used} but bitmap holds {counted}"
            )));
        }

        let mut owned = HashSet::new();
        let mut file_count = 0;
        let mut total_bytes = 0;
        for entry in self.table.entries() {
            file_count += 1;
            total_bytes += entry.size;

            let expected = self.config.blocks_for(entry.size);
            if entry.blocks.len() != expected {
                return Err(FileSystemError::Corrupted(format!(
                    "'{}' owns {} blocks, expected {expected}",
                    entry.name,
                    entry.blocks.len()
                )));
            }
            for &block in &entry.blocks {
                if !owned.insert(block) {
                    return Err(FileSystemError::Corrupted(format!(
                        "block {block} has more than one owner"
                    )));
                }
                if !self.blocks.is_used(block) {
                    return Err(FileSystemError::Corrupted(format!(
                        "block {block} owned by '{}' is marked free",
                        entry.name
                    )));
                }
            }
        }

        if owned.len() != used {
            return Err(FileSystemError::Corrupted(format!(
                "{used} blocks marked used but files own {}",
                owned.len()
            )));
        }
        if file_count != self.table.len() || total_bytes != self.total_bytes {
            return Err(FileSystemError::Corrupted(format!(
                "counters report {} files / {} bytes, table holds {file_count} / {total_bytes}",
                self.table.len(),
                self.total_bytes
            )));
        }
        Ok(())
    }
}
