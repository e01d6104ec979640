use glam::IVec3;

use crate::model::scene::RenderHandle;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Grass = 0,
    Stone = 1,
    Dirt = 2,
    Wood = 3,
    Ore = 4,
}

impl BlockKind {
    pub const ALL: [BlockKind; 5] = [
        BlockKind::Grass,
        BlockKind::Stone,
        BlockKind::Dirt,
        BlockKind::Wood,
        BlockKind::Ore,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Grass => "grass",
            BlockKind::Stone => "stone",
            BlockKind::Dirt => "dirt",
            BlockKind::Wood => "wood",
            BlockKind::Ore => "ore",
        }
    }

    /// File name of the kind's texture, relative to the texture source
    pub fn texture_file(self) -> &'static str {
        match self {
            BlockKind::Grass => "grasslight-big.jpg",
            BlockKind::Stone => "stone-01.jpg",
            BlockKind::Dirt => "dirt-01.jpg",
            BlockKind::Wood => "wood.jpg",
            BlockKind::Ore => "stone-02.jpg",
        }
    }

    /// Flat colour shown until the texture has loaded (and if it never does)
    pub fn color(self) -> [f32; 4] {
        match self {
            BlockKind::Grass => [0.3, 0.8, 0.2, 1.0],
            BlockKind::Stone => [0.5, 0.5, 0.5, 1.0],
            BlockKind::Dirt => [0.6, 0.4, 0.2, 1.0],
            BlockKind::Wood => [0.5, 0.3, 0.1, 1.0],
            BlockKind::Ore => [0.7, 0.6, 0.5, 1.0],
        }
    }

    pub fn color_rgba8(self) -> [u8; 4] {
        self.color().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

/// A placed block. Immutable once generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// grid coordinates
    pub position: IVec3,
    /// the block's object in the scene graph
    pub handle: RenderHandle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_kinds_are_distinct() {
        let names: HashSet<_> = BlockKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), BlockKind::COUNT);
        for (i, kind) in BlockKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_placeholder_color() {
        assert_eq!(BlockKind::Stone.color_rgba8(), [128, 128, 128, 255]);
    }
}
