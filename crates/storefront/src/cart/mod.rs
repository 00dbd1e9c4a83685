//! Cart store: reducer dispatch plus best-effort persistence.
//!
//! Every mutation after initialization serializes the full line sequence to
//! the storage collaborator under a fixed key. Persistence is
//! mutate-then-persist: a write failure is logged and the in-memory state
//! stays authoritative — there is no rollback.

mod reducer;

pub use reducer::{CartAction, CartLineItem, CartState, reduce};

use std::sync::Arc;

use rust_decimal::Decimal;

use verdant_core::ProductId;

use crate::catalog::Product;
use crate::storage::{KvStorage, keys};

/// The cart state container.
///
/// Created empty and uninitialized at application start; call
/// [`CartStore::restore`] once before use. A revision counter increments on
/// every observable state change and serves as a staleness token for async
/// collaborators: a response computed against an older revision must be
/// discarded.
pub struct CartStore {
    state: CartState,
    storage: Arc<dyn KvStorage>,
    revision: u64,
}

impl CartStore {
    /// Create an empty, uninitialized cart bound to a storage medium.
    #[must_use]
    pub fn new(storage: Arc<dyn KvStorage>) -> Self {
        Self {
            state: CartState::default(),
            storage,
            revision: 0,
        }
    }

    /// Restore the cart from storage and mark it initialized.
    ///
    /// An absent key, an unreadable medium, or malformed content all yield
    /// an empty cart; restoration never fails. Restored lines are
    /// normalized (zero quantities dropped, duplicate ids merged) and the
    /// normalized form is written back.
    pub fn restore(&mut self) {
        let items = match self.storage.get(keys::CART) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<CartLineItem>>(&bytes) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("discarding malformed persisted cart: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("failed to read persisted cart: {e}");
                Vec::new()
            }
        };
        self.dispatch(CartAction::Initialize(items));
    }

    /// Add one unit of `product` to the cart.
    pub fn add_item(&mut self, product: Product) {
        self.dispatch(CartAction::Add(product));
    }

    /// Remove the line for `id`; no-op if absent.
    pub fn remove_item(&mut self, id: &ProductId) {
        self.dispatch(CartAction::Remove(id.clone()));
    }

    /// Set the quantity for `id`; `quantity <= 0` removes the line.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        self.dispatch(CartAction::UpdateQuantity {
            id: id.clone(),
            quantity,
        });
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.dispatch(CartAction::Clear);
    }

    fn dispatch(&mut self, action: CartAction) {
        let next = reduce(&self.state, action);
        let changed = next != self.state;
        self.state = next;
        if changed {
            self.revision = self.revision.wrapping_add(1);
        }
        if changed && self.state.initialized {
            self.persist();
        }
    }

    fn persist(&self) {
        let bytes = match serde_json::to_vec(&self.state.items) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("failed to serialize cart for persistence: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(keys::CART, &bytes) {
            tracing::warn!("failed to persist cart: {e}");
        }
    }

    /// The current line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.state.items
    }

    /// Product names of the current lines, for the upsell request.
    #[must_use]
    pub fn item_names(&self) -> Vec<String> {
        self.state
            .items
            .iter()
            .map(|l| l.product.name.clone())
            .collect()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.state.items.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `unit price x quantity` across all lines, in the base
    /// currency. Recomputed on every call; never cached.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.state.items.iter().map(CartLineItem::line_price).sum()
    }

    /// Whether [`CartStore::restore`] has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// Staleness token: increments on every observable state change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::storage::MemoryStorage;

    fn product(id: &str) -> Product {
        Catalog::default()
            .get(&ProductId::from(id))
            .cloned()
            .unwrap()
    }

    fn store_with(storage: Arc<MemoryStorage>) -> CartStore {
        let mut store = CartStore::new(storage);
        store.restore();
        store
    }

    #[test]
    fn test_count_and_single_line_for_repeated_adds() {
        let mut store = store_with(Arc::new(MemoryStorage::new()));
        for _ in 0..3 {
            store.add_item(product("1"));
        }
        assert_eq!(store.count(), 3);
        assert_eq!(store.items().len(), 1);
    }

    #[test]
    fn test_total_price_recomputed_after_mutation() {
        let mut store = store_with(Arc::new(MemoryStorage::new()));
        store.add_item(product("7")); // 5.99
        store.add_item(product("8")); // 3.50
        assert_eq!(store.total_price(), Decimal::new(949, 2));

        store.update_quantity(&ProductId::from("7"), 3);
        assert_eq!(store.total_price(), Decimal::new(2147, 2)); // 3*5.99 + 3.50
    }

    #[test]
    fn test_persistence_roundtrip() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(Arc::clone(&storage));
        store.add_item(product("1"));
        store.add_item(product("2"));
        store.update_quantity(&ProductId::from("2"), 5);
        let before = store.items().to_vec();

        let mut restored = store_with(storage);
        assert!(restored.is_initialized());
        assert_eq!(restored.items(), before.as_slice());
        // Sanity: the restored store keeps working.
        restored.add_item(product("1"));
        assert_eq!(restored.count(), 7);
    }

    #[test]
    fn test_restore_with_malformed_payload_yields_empty_cart() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::CART, b"{not json").unwrap();
        let store = store_with(storage);
        assert!(store.is_initialized());
        assert!(store.is_empty());
    }

    #[test]
    fn test_restore_normalizes_degenerate_payload() {
        // Well-formed JSON can still carry lines the store itself would
        // never produce: zero quantities and duplicate product ids.
        let storage = Arc::new(MemoryStorage::new());
        let lines = vec![
            CartLineItem {
                product: product("1"),
                quantity: 0,
            },
            CartLineItem {
                product: product("2"),
                quantity: 2,
            },
            CartLineItem {
                product: product("2"),
                quantity: 1,
            },
        ];
        storage
            .set(keys::CART, &serde_json::to_vec(&lines).unwrap())
            .unwrap();

        let store = store_with(Arc::clone(&storage));
        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].product.id.as_str(), "2");
        assert_eq!(store.count(), 3);

        // The normalized form is written back.
        let bytes = storage.get(keys::CART).unwrap().unwrap();
        let persisted: Vec<CartLineItem> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(persisted, store.items());
    }

    #[test]
    fn test_restore_with_absent_key_yields_empty_cart() {
        let store = store_with(Arc::new(MemoryStorage::new()));
        assert!(store.is_initialized());
        assert!(store.is_empty());
    }

    #[test]
    fn test_write_failure_does_not_roll_back_memory_state() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(Arc::clone(&storage));
        storage.set_fail_writes(true);
        store.add_item(product("3"));
        assert_eq!(store.count(), 1);
        // The failed write left storage at its pre-mutation value.
        storage.set_fail_writes(false);
        assert_eq!(storage.get(keys::CART).unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn test_revision_bumps_on_change_only() {
        let mut store = store_with(Arc::new(MemoryStorage::new()));
        let after_init = store.revision();
        store.add_item(product("1"));
        let after_add = store.revision();
        assert!(after_add > after_init);

        // No-op remove leaves the revision alone.
        store.remove_item(&ProductId::from("999"));
        assert_eq!(store.revision(), after_add);
    }

    #[test]
    fn test_clear_persists_empty_list() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = store_with(Arc::clone(&storage));
        store.add_item(product("1"));
        store.clear();
        let bytes = storage.get(keys::CART).unwrap().unwrap();
        assert_eq!(bytes, b"[]");
    }
}
