// Flat terrain: one layer of randomly typed blocks on a square grid at y = 0.

use glam::{IVec3, Vec3};

use super::block::{Block, BlockKind};
use crate::model::scene::{Scene, SceneObject};

pub struct TerrainGenerator {
    block_size: f32,
    rng: fastrand::Rng,
}

impl TerrainGenerator {
    /// Generator seeded from entropy: every world is different
    pub fn new(block_size: f32) -> Self {
        Self {
            block_size,
            rng: fastrand::Rng::new(),
        }
    }

    /// Generator that produces the same world for the same seed
    pub fn with_seed(block_size: f32, seed: u64) -> Self {
        Self {
            block_size,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Lay out (2 * half_extent)^2 blocks covering x, z in
    /// [-half_extent, half_extent), registering each one with `scene`.
    pub fn generate(&mut self, half_extent: u32, scene: &mut Scene) -> Vec<Block> {
        let half = half_extent as i32;
        let side = 2 * half_extent as usize;
        let mut blocks = Vec::with_capacity(side * side);

        for x in -half..half {
            for z in -half..half {
                let kind = BlockKind::ALL[self.rng.usize(..BlockKind::COUNT)];
                let position = IVec3::new(x, 0, z);
                let handle = scene.add(SceneObject {
                    kind,
                    translation: block_center(position, self.block_size),
                    size: self.block_size,
                });
                blocks.push(Block { kind, position, handle });
            }
        }

        tracing::info!(
            "generated {} blocks ({}x{}, block size {})",
            blocks.len(),
            side,
            side,
            self.block_size
        );
        blocks
    }
}

/// Centre of the block at `position` in world space
pub fn block_center(position: IVec3, block_size: f32) -> Vec3 {
    position.as_vec3() * block_size
}
