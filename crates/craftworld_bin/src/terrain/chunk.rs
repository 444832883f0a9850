use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    pub p: i32,
    pub q: i32,
}

impl std::fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}:{})", self.p, self.q)
    }
}

impl ChunkKey {
    pub const fn new(p: i32, q: i32) -> Self {
        Self { p, q }
    }
}

impl From<(i32, i32)> for ChunkKey {
    fn from((p, q): (i32, i32)) -> Self {
        Self { p, q }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl VoxelPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

impl From<(i32, i32, i32)> for VoxelPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self { x, y, z }
    }
}

/// Block codes emitted by the Craft terrain.
///
/// A negative code is the same block seen from the padding ring of a
/// neighbouring chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum BlockType {
    Empty = 0,
    Grass = 1,
    Sand = 2,
    Wood = 5,
    Leaves = 15,
    Cloud = 16,
    TallGrass = 17,
    YellowFlower = 18,
    RedFlower = 19,
    PurpleFlower = 20,
    SunFlower = 21,
    WhiteFlower = 22,
    BlueFlower = 23,
}

impl BlockType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code.checked_abs()? {
            0 => Some(BlockType::Empty),
            1 => Some(BlockType::Grass),
            2 => Some(BlockType::Sand),
            5 => Some(BlockType::Wood),
            15 => Some(BlockType::Leaves),
            16 => Some(BlockType::Cloud),
            17 => Some(BlockType::TallGrass),
            18 => Some(BlockType::YellowFlower),
            19 => Some(BlockType::RedFlower),
            20 => Some(BlockType::PurpleFlower),
            21 => Some(BlockType::SunFlower),
            22 => Some(BlockType::WhiteFlower),
            23 => Some(BlockType::BlueFlower),
            _ => None,
        }
    }

    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Sparse block map for one chunk. Positions that were never written are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkData {
    key:    ChunkKey,
    blocks: HashMap<VoxelPos, i32>,
}

impl ChunkData {
    pub fn new(key: ChunkKey) -> Self {
        Self {
            key,
            blocks: HashMap::new(),
        }
    }

    pub fn key(&self) -> ChunkKey {
        self.key
    }

    /// Writes a block code. A later write to the same position wins.
    pub fn set(&mut self, pos: VoxelPos, code: i32) {
        self.blocks.insert(pos, code);
    }

    pub fn get(&self, pos: VoxelPos) -> Option<i32> {
        self.blocks.get(&pos).copied()
    }

    pub fn block_at(&self, pos: VoxelPos) -> i32 {
        self.get(pos).unwrap_or(BlockType::Empty.code())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VoxelPos, i32)> + '_ {
        self.blocks.iter().map(|(pos, code)| (*pos, *code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equality() {
        assert_eq!(ChunkKey::new(-1, 3), ChunkKey::from((-1, 3)));
        assert_ne!(ChunkKey::new(1, 3), ChunkKey::new(3, 1));
        assert_eq!(ChunkKey::new(-2, 7).to_string(), "(-2:7)");
    }

    #[test]
    fn test_later_write_wins() {
        let mut chunk = ChunkData::new(ChunkKey::new(0, 0));
        let pos = VoxelPos::new(1, 2, 3);
        chunk.set(pos, BlockType::Grass.code());
        chunk.set(pos, BlockType::TallGrass.code());
        assert_eq!(chunk.get(pos), Some(17));
        assert_eq!(chunk.len(), 1);
    }

    #[test]
    fn test_absent_is_empty() {
        let chunk = ChunkData::new(ChunkKey::new(0, 0));
        assert!(chunk.is_empty());
        assert_eq!(chunk.get(VoxelPos::new(0, 0, 0)), None);
        assert_eq!(chunk.block_at(VoxelPos::new(0, 0, 0)), 0);
    }

    #[test]
    fn test_block_codes() {
        assert_eq!(BlockType::from_code(-2), Some(BlockType::Sand));
        assert_eq!(BlockType::from_code(15), Some(BlockType::Leaves));
        assert_eq!(BlockType::from_code(3), None);
        assert_eq!(BlockType::from_code(i32::MIN), None);
    }
}
