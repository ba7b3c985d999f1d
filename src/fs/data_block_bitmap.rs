use crate::fs::block_store::BlockIndex;

#[derive(Debug, Clone)]
pub struct DataBlockBitmap {
    bits: Vec<u8>,       // 位图数据，每个 bit 表示一个数据块是否被占用
    total_blocks: usize, // 数据块总数
    free_blocks: usize,  // 当前空闲块数
}

impl DataBlockBitmap {
    pub fn new(total_blocks: usize) -> Self {
        let byte_len = total_blocks.div_ceil(8);

        Self {
            bits: vec![0; byte_len],
            total_blocks,
            free_blocks: total_blocks,
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    pub fn free_blocks(&self) -> usize {
        self.free_blocks
    }

    pub fn used_blocks(&self) -> usize {
        self.total_blocks.saturating_sub(self.free_blocks)
    }

    // 人为改写空闲计数，模拟计数被破坏
    #[cfg(test)]
    pub(crate) fn set_free_blocks(&mut self, free_blocks: usize) {
        self.free_blocks = free_blocks;
    }

    // 分配第一个空闲块（升序扫描），返回编号
    pub fn alloc(&mut self) -> Option<BlockIndex> {
        for (byte_index, byte) in self.bits.iter_mut().enumerate() {
            if *byte != 0xFF {
                for bit in 0..8 {
                    let index = byte_index * 8 + bit;
                    if index >= self.total_blocks {
                        return None; // 最后一个字节的填充位
                    }
                    if *byte & (1 << bit) == 0 {
                        *byte |= 1 << bit;
                        self.free_blocks = self.free_blocks.saturating_sub(1);
                        return Some(index);
                    }
                }
            }
        }
        None
    }

    // 标记为占用；已占用或越界时返回 false
    pub fn mark_used(&mut self, block_index: BlockIndex) -> bool {
        if block_index >= self.total_blocks || self.is_used(block_index) {
            return false;
        }
        self.bits[block_index / 8] |= 1 << (block_index % 8);
        self.free_blocks = self.free_blocks.saturating_sub(1);
        true
    }

    // 释放一个数据块；越界或本来就空闲时返回 false
    pub fn free(&mut self, block_index: BlockIndex) -> bool {
        if block_index >= self.total_blocks {
            return false;
        }

        let byte_index = block_index / 8;
        let bit_index = block_index % 8;

        if self.bits[byte_index] & (1 << bit_index) != 0 {
            self.bits[byte_index] &= !(1 << bit_index);
            self.free_blocks += 1;
            true
        } else {
            false
        }
    }

    pub fn is_used(&self, block_index: BlockIndex) -> bool {
        if block_index >= self.total_blocks {
            return false;
        }
        self.bits[block_index / 8] & (1 << (block_index % 8)) != 0
    }

    /// 查找编号最小的 `len` 个连续空闲块，返回起始块号
    pub fn find_free_run(&self, len: usize) -> Option<BlockIndex> {
        if len == 0 || len > self.free_blocks {
            return None;
        }

        let mut run_start = 0;
        let mut run_len = 0;
        for index in 0..self.total_blocks {
            if self.is_used(index) {
                run_len = 0;
                continue;
            }
            if run_len == 0 {
                run_start = index;
            }
            run_len += 1;
            if run_len == len {
                return Some(run_start);
            }
        }
        None
    }

    // 直接统计位图中置 1 的位数，用于校验 free_blocks 计数
    pub fn count_used(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }
}
