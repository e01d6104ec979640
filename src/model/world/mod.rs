pub mod block;
pub mod terrain;

pub use block::{Block, BlockKind};
pub use terrain::TerrainGenerator;
