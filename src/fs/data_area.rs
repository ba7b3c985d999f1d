use crate::fs::block_store::BlockIndex;

#[derive(Debug, Clone)]
pub struct DataArea {
    blocks: Vec<u8>,     // 所有数据块，扁平化存储
    block_size: usize,   // 每块字节数
    total_blocks: usize, // 块总数
}

impl DataArea {
    pub fn new(block_size: usize, total_blocks: usize) -> Self {
        Self {
            blocks: vec![0u8; total_blocks * block_size],
            block_size,
            total_blocks,
        }
    }

    fn range(&self, index: BlockIndex) -> Option<std::ops::Range<usize>> {
        if index >= self.total_blocks {
            return None;
        }
        let start = index * self.block_size;
        Some(start..start + self.block_size)
    }

    pub fn block(&self, index: BlockIndex) -> Option<&[u8]> {
        self.range(index).map(|r| &self.blocks[r])
    }

    // 从块内 pos 处写入，超出块尾的部分忽略，返回写入字节数
    pub fn write_at(&mut self, index: BlockIndex, pos: usize, buf: &[u8]) -> usize {
        let Some(range) = self.range(index) else {
            return 0;
        };
        if pos >= self.block_size {
            return 0;
        }
        let n = buf.len().min(self.block_size - pos);
        let start = range.start + pos;
        self.blocks[start..start + n].copy_from_slice(&buf[..n]);
        n
    }

    // 从块内 pos 处读到块尾为止，返回读取字节数
    pub fn read_at(&self, index: BlockIndex, pos: usize, out: &mut [u8]) -> usize {
        let Some(block) = self.block(index) else {
            return 0;
        };
        if pos >= self.block_size {
            return 0;
        }
        let n = out.len().min(self.block_size - pos);
        out[..n].copy_from_slice(&block[pos..pos + n]);
        n
    }

    // 清零，防止旧数据泄露给复用该块的新文件
    pub fn zero_block(&mut self, index: BlockIndex) {
        if let Some(range) = self.range(index) {
            self.blocks[range].fill(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DataArea;

    #[test]
    fn write_stops_at_block_end() {
        let mut area = DataArea::new(4, 2);
        assert_eq!(area.write_at(0, 2, b"abcdef"), 2);
        assert_eq!(area.block(0).unwrap(), b"\0\0ab");
        assert_eq!(area.block(1).unwrap(), b"\0\0\0\0");
    }

    #[test]
    fn read_after_zero() {
        let mut area = DataArea::new(4, 2);
        area.write_at(1, 0, b"wxyz");
        let mut out = [0u8; 3];
        assert_eq!(area.read_at(1, 1, &mut out), 3);
        assert_eq!(&out, b"xyz");

        area.zero_block(1);
        assert_eq!(area.read_at(1, 0, &mut out), 3);
        assert_eq!(out, [0, 0, 0]);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut area = DataArea::new(4, 2);
        assert_eq!(area.write_at(2, 0, b"a"), 0);
        assert!(area.block(2).is_none());
        area.zero_block(7);
    }
}
