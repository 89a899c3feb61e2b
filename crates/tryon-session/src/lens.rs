//! # Lens Loader
//!
//! Turns the product's lens identifiers, or the configured default pair,
//! into a loaded effect from the runtime's repository.

use tracing::{debug, info};

use tryon_core::EffectRef;

use crate::error::{SessionError, SessionResult};
use crate::guard::StepGuard;
use crate::platform::{ArRuntime, EffectHandle};

/// Resolves and loads lenses against one default pair.
#[derive(Debug, Clone)]
pub struct LensLoader {
    default: EffectRef,
}

impl LensLoader {
    pub fn new(default: EffectRef) -> Self {
        LensLoader { default }
    }

    /// Picks the lens to load.
    ///
    /// Both identifiers must be present to be used; otherwise the default
    /// pair is used whole, so generic try-on always lands on the same lens.
    pub fn resolve(&self, effect_id: Option<&str>, group_id: Option<&str>) -> EffectRef {
        let resolved = EffectRef::resolve(effect_id, group_id, &self.default);
        if resolved == self.default {
            debug!(effect = %resolved, "Using default lens");
        }
        resolved
    }

    /// Loads the lens from the runtime's effect repository.
    pub async fn load_effect(
        &self,
        runtime: &dyn ArRuntime,
        effect_id: Option<&str>,
        group_id: Option<&str>,
        guard: &StepGuard,
    ) -> SessionResult<EffectHandle> {
        let effect = self.resolve(effect_id, group_id);

        let handle = guard
            .run("load_effect", async {
                runtime
                    .load_effect(&effect)
                    .await
                    .map_err(|e| SessionError::AssetLoad {
                        effect_id: effect.effect_id.clone(),
                        group_id: effect.group_id.clone(),
                        message: e.to_string(),
                    })
            })
            .await?;

        info!(effect = %effect, name = ?handle.name, "Lens loaded");
        Ok(handle)
    }
}

impl Default for LensLoader {
    fn default() -> Self {
        LensLoader::new(EffectRef::builtin_default())
    }
}
