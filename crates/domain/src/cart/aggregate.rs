//! Cart document.

use common::UserId;
use record_store::{Document, Filter};
use serde::{Deserialize, Serialize};

use super::{CartError, CartItem, ItemKey};

/// A user's cart.
///
/// Stored one per user (unique on `userId`) and created lazily on the first
/// add or sync. Lines keep insertion order and there is at most one line per
/// [`ItemKey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Owner of the cart.
    user_id: UserId,

    /// Lines in insertion order.
    #[serde(default)]
    items: Vec<CartItem>,
}

impl Document for Cart {
    const COLLECTION: &'static str = "carts";

    fn unique_fields() -> &'static [&'static str] {
        &["userId"]
    }
}

// Query methods
impl Cart {
    /// Creates an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
        }
    }

    /// Filter selecting the cart of a user.
    pub fn filter_for(user_id: UserId) -> Filter {
        Filter::by("userId", user_id.to_string())
    }

    /// Returns the owner.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Consumes the cart, returning its lines.
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Returns the line with the given identity key.
    pub fn get_item(&self, key: &ItemKey) -> Option<&CartItem> {
        self.items.iter().find(|item| item.matches(key))
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// Mutations
impl Cart {
    /// Adds an item, merging into an existing line with the same key.
    ///
    /// On a merge only the quantity changes; the existing line keeps its
    /// price and descriptive snapshot.
    pub fn add_item(&mut self, item: CartItem) {
        let key = item.key();
        match self.items.iter_mut().find(|line| line.matches(&key)) {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
    }

    /// Adds every item in order, applying the merge rule to each.
    ///
    /// Two incoming items with the same key both merge into one line.
    pub fn merge_items(&mut self, items: impl IntoIterator<Item = CartItem>) {
        for item in items {
            self.add_item(item);
        }
    }

    /// Overwrites the quantity of the line with the given key.
    pub fn update_quantity(&mut self, key: &ItemKey, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }

        let line = self
            .items
            .iter_mut()
            .find(|line| line.matches(key))
            .ok_or_else(|| CartError::LineNotFound { key: key.clone() })?;
        line.quantity = quantity;
        Ok(())
    }

    /// Drops the line with the given key.
    ///
    /// Returns false, leaving the cart untouched, if no line matches.
    pub fn remove_item(&mut self, key: &ItemKey) -> bool {
        let before = self.items.len();
        self.items.retain(|line| !line.matches(key));
        self.items.len() != before
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
