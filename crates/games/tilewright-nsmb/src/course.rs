use tilewright_core::LevelError;

/// Block count of a course file header.
pub const COURSE_BLOCKS: usize = 14;
const ENTRY_LEN: usize = 8;
const HEADER_LEN: usize = COURSE_BLOCKS * ENTRY_LEN;

/// Course file split into its raw blocks. The header is a table of
/// `(offset: u32, size: u32)` big-endian pairs, one per block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseFile {
    blocks: Vec<Vec<u8>>,
}

impl Default for CourseFile {
    fn default() -> Self {
        Self {
            blocks: vec![Vec::new(); COURSE_BLOCKS],
        }
    }
}

impl CourseFile {
    pub fn decode(data: &[u8]) -> Result<Self, LevelError> {
        if data.len() < HEADER_LEN {
            return Err(LevelError::CorruptData("truncated course header".into()));
        }
        let word = |at: usize| {
            u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]) as usize
        };
        let mut blocks = Vec::with_capacity(COURSE_BLOCKS);
        for index in 0..COURSE_BLOCKS {
            let offset = word(index * ENTRY_LEN);
            let size = word(index * ENTRY_LEN + 4);
            let block = offset
                .checked_add(size)
                .and_then(|end| data.get(offset..end))
                .ok_or_else(|| {
                    LevelError::CorruptData(format!("course block {index} out of bounds"))
                })?;
            blocks.push(block.to_vec());
        }
        Ok(Self { blocks })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut header = Vec::with_capacity(HEADER_LEN);
        let mut body = Vec::new();
        for block in &self.blocks {
            header.extend_from_slice(&((HEADER_LEN + body.len()) as u32).to_be_bytes());
            header.extend_from_slice(&(block.len() as u32).to_be_bytes());
            body.extend_from_slice(block);
        }
        header.extend(body);
        header
    }

    pub fn block(&self, index: usize) -> Option<&[u8]> {
        self.blocks.get(index).map(Vec::as_slice)
    }

    /// Replace a block. Out-of-range indices are ignored.
    pub fn set_block(&mut self, index: usize, data: Vec<u8>) {
        if let Some(block) = self.blocks.get_mut(index) {
            *block = data;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_keep_their_contents() {
        let mut course = CourseFile::default();
        course.set_block(0, b"options".to_vec());
        course.set_block(7, vec![0xFF; 4]);
        course.set_block(COURSE_BLOCKS, vec![1]);

        let decoded = CourseFile::decode(&course.encode()).unwrap();
        assert_eq!(decoded.block(0), Some(&b"options"[..]));
        assert_eq!(decoded.block(7), Some(&[0xFFu8; 4][..]));
        assert_eq!(decoded.block(3), Some(&[][..]));
        assert_eq!(decoded.block(COURSE_BLOCKS), None);
    }

    #[test]
    fn bad_block_bounds_are_corrupt() {
        let mut bytes = CourseFile::default().encode();
        bytes[4..8].copy_from_slice(&64u32.to_be_bytes());
        assert!(matches!(CourseFile::decode(&bytes), Err(LevelError::CorruptData(_))));
        assert!(CourseFile::decode(&bytes[..10]).is_err());
    }
}
