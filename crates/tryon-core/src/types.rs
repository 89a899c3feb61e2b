//! # Domain Types
//!
//! Records and identifiers shared by the engine and the view.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   EffectRef     │   │  TryOnTarget    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │──►│  effect_id      │   │  Featured       │       │
//! │  │  name           │   │  group_id       │   │  Product(id)    │       │
//! │  │  ar_lens_id?    │   │                 │   │                 │       │
//! │  │  ar_lens_group? │   │  always both    │   │  from route     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Product records are mirrored verbatim from the document store. The only
//! thing enforced locally is field presence.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::{DEFAULT_EFFECT_GROUP_ID, DEFAULT_EFFECT_ID, FEATURED_TARGET};

// =============================================================================
// Product
// =============================================================================

/// A product record as stored in the `products` collection.
///
/// Field names follow the document store (camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Document id.
    #[serde(default)]
    pub id: String,

    /// Display name, used as the try-on page title.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Price in the store currency. Display only; pricing is not ours.
    #[serde(default)]
    pub price: f64,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub available_sizes: Vec<String>,

    #[serde(default)]
    pub featured: bool,

    /// Lens to apply when trying this product on.
    #[serde(default)]
    pub ar_lens_id: Option<String>,

    /// Group the lens is published under.
    #[serde(default)]
    pub ar_lens_group_id: Option<String>,
}

impl Product {
    /// Builds a product from a raw document and its id.
    ///
    /// The document body does not carry its own id, so the caller passes the
    /// key it was fetched by.
    pub fn from_document(id: &str, document: serde_json::Value) -> CoreResult<Self> {
        let mut product: Product =
            serde_json::from_value(document).map_err(|e| CoreError::MalformedDocument {
                id: id.to_string(),
                reason: e.to_string(),
            })?;
        product.id = id.to_string();
        Ok(product)
    }

    /// Whether the product page should offer the "try in AR" entry point.
    ///
    /// Both lens identifiers must be present and non-empty.
    pub fn supports_try_on(&self) -> bool {
        non_empty(self.ar_lens_id.as_deref()).is_some()
            && non_empty(self.ar_lens_group_id.as_deref()).is_some()
    }

    /// The lens identifiers carried by this product, if complete.
    pub fn effect_ref(&self) -> Option<EffectRef> {
        EffectRef::from_parts(self.ar_lens_id.as_deref(), self.ar_lens_group_id.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Effect Reference
// =============================================================================

/// A fully-resolved lens identifier pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EffectRef {
    /// Lens id inside the group.
    pub effect_id: String,

    /// Lens group id.
    pub group_id: String,
}

impl EffectRef {
    /// Creates a reference from both identifiers.
    pub fn new(effect_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        EffectRef {
            effect_id: effect_id.into(),
            group_id: group_id.into(),
        }
    }

    /// Built-in default lens.
    pub fn builtin_default() -> Self {
        EffectRef::new(DEFAULT_EFFECT_ID, DEFAULT_EFFECT_GROUP_ID)
    }

    /// Returns a reference only when both parts are present and non-empty.
    pub fn from_parts(effect_id: Option<&str>, group_id: Option<&str>) -> Option<Self> {
        match (non_empty(effect_id), non_empty(group_id)) {
            (Some(effect), Some(group)) => Some(EffectRef::new(effect, group)),
            _ => None,
        }
    }

    /// Resolves optional identifiers against a fallback pair.
    ///
    /// If either identifier is missing the fallback is used as a whole.
    /// Identifiers are never mixed between the product and the fallback.
    pub fn resolve(effect_id: Option<&str>, group_id: Option<&str>, fallback: &EffectRef) -> Self {
        Self::from_parts(effect_id, group_id).unwrap_or_else(|| fallback.clone())
    }
}

impl std::fmt::Display for EffectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.group_id, self.effect_id)
    }
}

// =============================================================================
// Try-On Target
// =============================================================================

/// What the try-on view was opened for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
#[ts(export)]
pub enum TryOnTarget {
    /// Generic try-on with the default lens.
    Featured,

    /// Try-on for a specific product id.
    Product(String),
}

impl TryOnTarget {
    /// Parses the route segment (`/ar/:productId`).
    ///
    /// Both an empty segment and the literal `featured` mean generic try-on.
    pub fn from_route(segment: Option<&str>) -> Self {
        match segment.map(str::trim) {
            None | Some("") => TryOnTarget::Featured,
            Some(s) if s == FEATURED_TARGET => TryOnTarget::Featured,
            Some(id) => TryOnTarget::Product(id.to_string()),
        }
    }

    /// Returns the product id, if any.
    pub fn product_id(&self) -> Option<&str> {
        match self {
            TryOnTarget::Featured => None,
            TryOnTarget::Product(id) => Some(id),
        }
    }
}

impl std::fmt::Display for TryOnTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TryOnTarget::Featured => write!(f, "{}", FEATURED_TARGET),
            TryOnTarget::Product(id) => write!(f, "product:{}", id),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
