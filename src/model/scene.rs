use glam::Vec3;

use crate::model::world::BlockKind;

/// Opaque reference to an object registered with the [`Scene`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderHandle(usize);

impl RenderHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A unit cube of one block kind, placed at `translation` and scaled by `size`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneObject {
    pub kind: BlockKind,
    pub translation: Vec3,
    pub size: f32,
}

/// Flat scene graph: everything the renderer draws besides the UI.
///
/// Objects are only ever added. `revision` changes on every addition so the
/// renderer knows when its instance buffers are stale.
#[derive(Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    revision: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> RenderHandle {
        let handle = RenderHandle(self.objects.len());
        self.objects.push(object);
        self.revision += 1;
        handle
    }

    pub fn get(&self, handle: RenderHandle) -> Option<&SceneObject> {
        self.objects.get(handle.index())
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(kind: BlockKind, x: f32) -> SceneObject {
        SceneObject { kind, translation: Vec3::new(x, 0.0, 0.0), size: 1.0 }
    }

    #[test]
    fn test_add_returns_stable_handles() {
        let mut scene = Scene::new();
        assert!(scene.is_empty());

        let a = scene.add(cube(BlockKind::Grass, 0.0));
        let b = scene.add(cube(BlockKind::Ore, 1.0));

        assert_ne!(a, b);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.revision(), 2);
        assert_eq!(scene.get(b).map(|o| o.kind), Some(BlockKind::Ore));
        assert_eq!(scene.get(a).map(|o| o.translation.x), Some(0.0));
    }

    #[test]
    fn test_objects_in_insertion_order() {
        let mut scene = Scene::new();
        let handles: Vec<RenderHandle> = [BlockKind::Wood, BlockKind::Dirt, BlockKind::Wood]
            .into_iter()
            .enumerate()
            .map(|(i, kind)| scene.add(cube(kind, i as f32)))
            .collect();

        let kinds: Vec<BlockKind> = scene.objects().iter().map(|o| o.kind).collect();
        assert_eq!(kinds, vec![BlockKind::Wood, BlockKind::Dirt, BlockKind::Wood]);
        for (i, handle) in handles.iter().enumerate() {
            assert_eq!(handle.index(), i);
            assert_eq!(scene.get(*handle), scene.objects().get(i));
        }
    }
}
