//! # Target Resolution
//!
//! Fetches the product a try-on view was opened for, once, before the
//! session starts. The lookup never blocks entry into AR mode: a missing
//! record, a malformed record or a store failure all fall back to generic
//! try-on with the default lens.

use serde::Serialize;
use tracing::{debug, warn};

use tryon_core::{Product, TryOnTarget, PRODUCTS_COLLECTION};

use crate::platform::DocumentStore;

/// A target together with the product record it resolved to, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTarget {
    pub target: TryOnTarget,
    pub product: Option<Product>,
}

impl ResolvedTarget {
    /// Generic try-on, no product.
    pub fn featured() -> Self {
        ResolvedTarget {
            target: TryOnTarget::Featured,
            product: None,
        }
    }

    /// A target whose product is already known.
    pub fn with_product(product: Product) -> Self {
        ResolvedTarget {
            target: TryOnTarget::Product(product.id.clone()),
            product: Some(product),
        }
    }

    /// The product's lens identifiers, as stored.
    pub fn effect_ids(&self) -> (Option<&str>, Option<&str>) {
        match &self.product {
            Some(p) => (p.ar_lens_id.as_deref(), p.ar_lens_group_id.as_deref()),
            None => (None, None),
        }
    }
}

/// Looks the target's product up in the store.
pub async fn resolve_target(store: &dyn DocumentStore, target: TryOnTarget) -> ResolvedTarget {
    let Some(id) = target.product_id() else {
        return ResolvedTarget {
            target,
            product: None,
        };
    };

    let product = match store.get_by_id(PRODUCTS_COLLECTION, id).await {
        Ok(Some(document)) => match Product::from_document(id, document) {
            Ok(product) => {
                debug!(product_id = %id, name = %product.name, "Resolved try-on product");
                Some(product)
            }
            Err(e) => {
                warn!(product_id = %id, error = %e, "Ignoring malformed product record");
                None
            }
        },
        Ok(None) => {
            warn!(product_id = %id, "Product not found, falling back to generic try-on");
            None
        }
        Err(e) => {
            warn!(product_id = %id, error = %e, "Error fetching product, falling back to generic try-on");
            None
        }
    };

    ResolvedTarget { target, product }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::MemoryStore;
    use serde_json::json;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert(
            PRODUCTS_COLLECTION,
            "p1",
            json!({ "name": "Chaqueta", "arLensId": "A", "arLensGroupId": "B" }),
        );
        store.insert(PRODUCTS_COLLECTION, "broken", json!({ "price": "free" }));
        store
    }

    #[tokio::test]
    async fn test_featured_skips_lookup() {
        let resolved = resolve_target(&MemoryStore::unavailable(), TryOnTarget::Featured).await;
        assert_eq!(resolved, ResolvedTarget::featured());
        assert_eq!(resolved.effect_ids(), (None, None));
    }

    #[tokio::test]
    async fn test_product_found() {
        let resolved = resolve_target(&store(), TryOnTarget::Product("p1".into())).await;
        let product = resolved.product.as_ref().unwrap();
        assert_eq!(product.id, "p1");
        assert_eq!(resolved.effect_ids(), (Some("A"), Some("B")));
    }

    #[tokio::test]
    async fn test_failures_fall_back() {
        for (store, id) in [
            (store(), "missing"),
            (store(), "broken"),
            (MemoryStore::unavailable(), "p1"),
        ] {
            let resolved = resolve_target(&store, TryOnTarget::Product(id.into())).await;
            assert_eq!(resolved.target, TryOnTarget::Product(id.into()));
            assert!(resolved.product.is_none(), "{} should fall back", id);
        }
    }
}
