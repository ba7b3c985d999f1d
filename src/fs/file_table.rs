use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};

use crate::fs::{
    block_store::BlockIndex,
    error::{FileSystemError, Result},
};

/// 文件表中的一个槽位
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name: String,             // 文件名，在用表项中唯一
    pub size: usize,              // 逻辑大小（字节）
    pub blocks: Vec<BlockIndex>,  // 拥有的块，创建后不再变化
    pub in_use: bool,             // 槽位是否被占用
    pub created_at: DateTime<Local>,
    pub modified_at: DateTime<Local>,
}

impl FileEntry {
    pub fn new(name: &str, size: usize, blocks: Vec<BlockIndex>) -> Self {
        let now = Local::now();
        Self {
            name: name.to_string(),
            size,
            blocks,
            in_use: true,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn empty() -> Self {
        let epoch = DateTime::<Utc>::UNIX_EPOCH.with_timezone(&Local);
        Self {
            name: String::new(),
            size: 0,
            blocks: Vec::new(),
            in_use: false,
            created_at: epoch,
            modified_at: epoch,
        }
    }

    pub fn touch(&mut self) {
        self.modified_at = Local::now();
    }
}

#[derive(Debug, Clone)]
pub struct FileTable {
    slots: Vec<FileEntry>,
    index_map: HashMap<String, usize>, // name -> slot
}

impl FileTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![FileEntry::empty(); capacity],
            index_map: HashMap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    // 在用表项数
    pub fn len(&self) -> usize {
        self.index_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_map.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_map.contains_key(name)
    }

    pub fn slot_of(&self, name: &str) -> Result<usize> {
        self.index_map
            .get(name)
            .copied()
            .ok_or_else(|| FileSystemError::NotFound(name.to_string()))
    }

    pub fn find(&self, name: &str) -> Result<&FileEntry> {
        let slot = self.slot_of(name)?;
        Ok(&self.slots[slot])
    }

    pub fn find_mut(&mut self, name: &str) -> Result<&mut FileEntry> {
        let slot = self.slot_of(name)?;
        Ok(&mut self.slots[slot])
    }

    // 升序查找第一个空闲槽位
    pub fn reserve_slot(&self) -> Result<usize> {
        self.slots
            .iter()
            .position(|entry| !entry.in_use)
            .ok_or(FileSystemError::TableFull {
                capacity: self.capacity(),
            })
    }

    // 把表项放入 reserve_slot 返回的槽位
    pub fn occupy(&mut self, slot: usize, entry: FileEntry) -> Result<()> {
        match self.slots.get(slot) {
            Some(current) if !current.in_use => {}
            Some(_) => {
                return Err(FileSystemError::Corrupted(format!(
                    "slot {slot} is already occupied"
                )))
            }
            None => {
                return Err(FileSystemError::InvalidArgument(format!(
                    "slot {slot} is outside the file table"
                )))
            }
        }
        if self.index_map.contains_key(&entry.name) {
            return Err(FileSystemError::AlreadyExists(entry.name));
        }
        self.index_map.insert(entry.name.clone(), slot);
        self.slots[slot] = FileEntry {
            in_use: true,
            ..entry
        };
        Ok(())
    }

    /// 清空槽位使其可被复用，返回原表项
    pub fn release_slot(&mut self, slot: usize) -> Option<FileEntry> {
        let entry = self.slots.get_mut(slot)?;
        if !entry.in_use {
            return None;
        }
        let old = std::mem::replace(entry, FileEntry::empty());
        self.index_map.remove(&old.name);
        Some(old)
    }

    // 按槽位顺序遍历在用表项
    pub fn entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.slots.iter().filter(|entry| entry.in_use)
    }
}
