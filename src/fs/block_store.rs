use tracing::{debug, trace, warn};

use crate::fs::{
    data_area::DataArea,
    data_block_bitmap::DataBlockBitmap,
    error::{FileSystemError, Result},
};

/// 数据块在块池中的位置，是块的唯一引用
pub type BlockIndex = usize;

/// 块池及其占用位图
///
/// 位图只通过 `allocate` / `free` 修改，保证每个占用块只有一个所有者。
#[derive(Debug, Clone)]
pub struct BlockStore {
    bitmap: DataBlockBitmap, // 数据块占用信息
    data: DataArea,          // 数据块内容
}

impl BlockStore {
    pub fn new(block_size: usize, total_blocks: usize) -> Self {
        Self {
            bitmap: DataBlockBitmap::new(total_blocks),
            data: DataArea::new(block_size, total_blocks),
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.bitmap.total_blocks()
    }

    pub fn used_blocks(&self) -> usize {
        self.bitmap.used_blocks()
    }

    pub fn free_blocks(&self) -> usize {
        self.bitmap.free_blocks()
    }

    pub fn is_used(&self, index: BlockIndex) -> bool {
        self.bitmap.is_used(index)
    }

    // 直接从位图统计的占用块数
    pub fn count_used(&self) -> usize {
        self.bitmap.count_used()
    }

    /// 分配 `n` 个互不相同的空闲块，要么全部成功，要么不做任何修改
    ///
    /// 优先取编号最小的连续空闲区；碎片过多时取前 `n` 个空闲块。返回的编号升序排列。
    pub fn allocate(&mut self, n: usize) -> Result<Vec<BlockIndex>> {
        let available = self.free_blocks();
        if n > available {
            return Err(FileSystemError::InsufficientSpace {
                requested: n,
                available,
            });
        }
        if n == 0 {
            return Ok(Vec::new());
        }

        // 1. 优先连续分配
        if let Some(start) = self.bitmap.find_free_run(n) {
            for index in start..start + n {
                self.bitmap.mark_used(index);
            }
            debug!(start, n, "allocated contiguous blocks");
            return Ok((start..start + n).collect());
        }

        // 2. 退化为分散分配
        let mut blocks = Vec::with_capacity(n);
        while blocks.len() < n {
            match self.bitmap.alloc() {
                Some(index) => blocks.push(index),
                None => break,
            }
        }

        if blocks.len() < n {
            // 容量预检已通过却凑不够块，说明计数被破坏；回滚已标记的块
            warn!(
                requested = n,
                collected = blocks.len(),
                "scattered allocation fell short, rolling back"
            );
            for &index in &blocks {
                self.bitmap.free(index);
            }
            return Err(FileSystemError::InsufficientSpace {
                requested: n,
                available: self.free_blocks(),
            });
        }

        debug!(n, ?blocks, "allocated scattered blocks");
        Ok(blocks)
    }

    // 释放并清零占用块；空闲或越界的编号直接跳过
    pub fn free(&mut self, indices: &[BlockIndex]) {
        for &index in indices {
            if self.bitmap.free(index) {
                self.data.zero_block(index);
            } else {
                trace!(index, "skipping free of unoccupied block");
            }
        }
    }

    pub fn write_at(&mut self, index: BlockIndex, pos: usize, buf: &[u8]) -> usize {
        self.data.write_at(index, pos, buf)
    }

    pub fn read_at(&self, index: BlockIndex, pos: usize, out: &mut [u8]) -> usize {
        self.data.read_at(index, pos, out)
    }

    pub fn block(&self, index: BlockIndex) -> Option<&[u8]> {
        self.data.block(index)
    }

    #[cfg(test)]
    pub(crate) fn bitmap_mut(&mut self) -> &mut DataBlockBitmap {
        &mut self.bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_prefers_contiguous_run() {
        let mut store = BlockStore::new(1, 8);
        assert_eq!(store.allocate(2).unwrap(), vec![0, 1]);
        assert_eq!(store.allocate(1).unwrap(), vec![2]);
        store.free(&[1]);
        // 空洞只有 1 块，3 块请求应跳到后面的连续区
        assert_eq!(store.allocate(3).unwrap(), vec![3, 4, 5]);
        assert_eq!(store.allocate(1).unwrap(), vec![1]);
    }

    #[test]
    fn allocate_falls_back_to_scattered() {
        let mut store = BlockStore::new(1, 6);
        store.allocate(6).unwrap();
        store.free(&[0, 2, 4]);
        assert_eq!(store.allocate(3).unwrap(), vec![0, 2, 4]);
        assert_eq!(store.free_blocks(), 0);
    }

    #[test]
    fn allocate_is_all_or_nothing() {
        let mut store = BlockStore::new(1, 4);
        store.allocate(3).unwrap();
        let err = store.allocate(2).unwrap_err();
        assert_eq!(
            err,
            FileSystemError::InsufficientSpace {
                requested: 2,
                available: 1
            }
        );
        assert_eq!(store.used_blocks(), 3);
        assert_eq!(store.count_used(), 3);
    }

    #[test]
    fn free_zeroes_and_tolerates_redundant_release() {
        let mut store = BlockStore::new(4, 4);
        let blocks = store.allocate(2).unwrap();
        store.write_at(blocks[0], 0, b"data");
        store.free(&blocks);
        store.free(&blocks);
        store.free(&[42]);
        assert_eq!(store.used_blocks(), 0);
        assert_eq!(store.block(blocks[0]).unwrap(), &[0, 0, 0, 0]);
    }

    #[test]
    fn allocate_zero_is_empty() {
        let mut store = BlockStore::new(1, 2);
        assert!(store.allocate(0).unwrap().is_empty());
        assert_eq!(store.used_blocks(), 0);
    }

    #[test]
    fn scattered_shortfall_rolls_back_marked_blocks() {
        let mut store = BlockStore::new(1, 4);
        assert_eq!(store.allocate(1).unwrap(), vec![0]);
        // 空闲计数虚高 2：预检通过，但实际只有 3 个空闲块
        store.bitmap_mut().set_free_blocks(5);

        assert_eq!(
            store.allocate(5).unwrap_err(),
            FileSystemError::InsufficientSpace {
                requested: 5,
                available: 5
            }
        );
        assert_eq!(store.count_used(), 1);
        assert!(store.is_used(0));
        for index in 1..4 {
            assert!(!store.is_used(index));
        }
    }
}
