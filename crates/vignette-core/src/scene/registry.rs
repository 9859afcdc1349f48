//! Registered table of scene constructors.

use ahash::AHashMap;

use super::{Scene, SceneId};
use crate::error::SceneError;

/// Builds a scene instance for an identifier.
pub trait SceneFactory {
    fn build(&self, id: &SceneId) -> anyhow::Result<Box<dyn Scene>>;
}

impl<F> SceneFactory for F
where
    F: Fn(&SceneId) -> anyhow::Result<Box<dyn Scene>>,
{
    fn build(&self, id: &SceneId) -> anyhow::Result<Box<dyn Scene>> {
        self(id)
    }
}

/// Maps scene identifiers to their factories.
///
/// Identifiers are validated when registered, so a transition can only fail
/// to build a scene because the content itself failed.
#[derive(Default)]
pub struct SceneRegistry {
    factories: AHashMap<SceneId, Box<dyn SceneFactory>>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. Duplicate identifiers are rejected.
    pub fn register(
        &mut self,
        id: impl Into<SceneId>,
        factory: impl SceneFactory + 'static,
    ) -> Result<(), SceneError> {
        let id = id.into();
        if self.factories.contains_key(&id) {
            return Err(SceneError::DuplicateScene(id));
        }
        log::debug!("Registered scene '{}'", id);
        self.factories.insert(id, Box::new(factory));
        Ok(())
    }

    pub fn contains(&self, id: &SceneId) -> bool {
        self.factories.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<SceneId> {
        let mut ids: Vec<SceneId> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Construct a scene.
    pub fn build(&self, id: &SceneId) -> Result<Box<dyn Scene>, SceneError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| SceneError::UnknownScene(id.clone()))?;
        factory.build(id).map_err(|source| SceneError::Construction {
            id: id.clone(),
            source,
        })
    }
}
