//! Cart line items and their identity key.

use serde::{Deserialize, Serialize};

use super::CartError;

/// Identity of a cart line: product, variant and pack.
///
/// Two lines with the same key are the same line; adding one merges into
/// the other. Blank variant and pack ids are treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemKey {
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub pack_id: Option<String>,
}

impl ItemKey {
    /// Creates a key, normalizing blank optional parts to `None`.
    pub fn new(
        product_id: impl Into<String>,
        variant_id: Option<String>,
        pack_id: Option<String>,
    ) -> Self {
        Self {
            product_id: product_id.into().trim().to_string(),
            variant_id: non_blank(variant_id),
            pack_id: non_blank(pack_id),
        }
    }

    /// Key for a product without variant or pack.
    pub fn product(product_id: impl Into<String>) -> Self {
        Self::new(product_id, None, None)
    }

    /// Normalizes every part and requires a product id.
    pub fn validated(self) -> Result<Self, CartError> {
        let key = Self::new(self.product_id, self.variant_id, self.pack_id);
        if key.product_id.is_empty() {
            return Err(CartError::ProductIdRequired);
        }
        Ok(key)
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.product_id,
            self.variant_id.as_deref().unwrap_or("-"),
            self.pack_id.as_deref().unwrap_or("-")
        )
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A line in a user's cart.
///
/// `price` and the descriptive fields are a snapshot taken when the item
/// was first added; merging only touches `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pack_id: Option<String>,

    pub quantity: u32,

    pub price: f64,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_type: Option<String>,
}

impl CartItem {
    /// Creates an item with only the required fields set.
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        quantity: u32,
        price: f64,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id: None,
            pack_id: None,
            quantity,
            price,
            name: name.into(),
            image: None,
            brand: None,
            variant_label: None,
            sku: None,
            food_type: None,
        }
    }

    /// Sets the variant id.
    pub fn with_variant(mut self, variant_id: impl Into<String>) -> Self {
        self.variant_id = Some(variant_id.into());
        self
    }

    /// Sets the pack id.
    pub fn with_pack(mut self, pack_id: impl Into<String>) -> Self {
        self.pack_id = Some(pack_id.into());
        self
    }

    /// Returns the identity key of this line.
    pub fn key(&self) -> ItemKey {
        ItemKey::new(
            self.product_id.clone(),
            self.variant_id.clone(),
            self.pack_id.clone(),
        )
    }

    /// Returns true if this line has the given identity key.
    pub fn matches(&self, key: &ItemKey) -> bool {
        self.key() == *key
    }

    /// Checks the item and normalizes its identity fields.
    pub fn validated(self) -> Result<Self, CartError> {
        if self.quantity == 0 {
            return Err(CartError::InvalidQuantity {
                quantity: self.quantity,
            });
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(CartError::InvalidPrice { price: self.price });
        }

        let key = self.key();
        if key.product_id.is_empty() {
            return Err(CartError::ProductIdRequired);
        }

        Ok(Self {
            product_id: key.product_id,
            variant_id: key.variant_id,
            pack_id: key.pack_id,
            ..self
        })
    }
}
