//! Cart service providing the per-user cart operations.

use common::UserId;
use record_store::RecordStore;

use crate::error::DomainError;
use crate::handler::DocumentHandler;

use super::{Cart, CartError, CartItem, ItemKey};

/// Service for managing carts.
///
/// Every operation is scoped to an already-resolved user id and follows the
/// same shape: load the cart, mutate it in memory, write it back once.
pub struct CartService<S: RecordStore> {
    handler: DocumentHandler<S, Cart>,
}

impl<S: RecordStore> CartService<S> {
    /// Creates a new cart service with the given record store.
    pub fn new(store: S) -> Self {
        Self {
            handler: DocumentHandler::new(store),
        }
    }

    /// Returns a reference to the underlying document handler.
    pub fn handler(&self) -> &DocumentHandler<S, Cart> {
        &self.handler
    }

    /// Returns the cart lines, or nothing if the user has no cart.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, user_id: UserId) -> Result<Vec<CartItem>, DomainError> {
        let cart = self.handler.load_one(&Cart::filter_for(user_id)).await?;
        Ok(cart.map(|c| c.doc.into_items()).unwrap_or_default())
    }

    /// Adds an item, creating the cart if needed.
    #[tracing::instrument(skip(self, item), fields(product_id = %item.product_id))]
    pub async fn add(&self, user_id: UserId, item: CartItem) -> Result<Vec<CartItem>, DomainError> {
        let item = item.validated()?;
        metrics::counter!("cart_operations_total", "operation" => "add").increment(1);

        let cart = self
            .handler
            .load_or_create(&Cart::filter_for(user_id), || Cart::new(user_id))
            .await?;
        let result = self
            .handler
            .execute(cart, |cart| {
                cart.add_item(item);
                Ok::<_, CartError>(())
            })
            .await?;

        Ok(result.document.doc.into_items())
    }

    /// Overwrites the quantity of an existing line.
    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        user_id: UserId,
        key: ItemKey,
        quantity: u32,
    ) -> Result<Vec<CartItem>, DomainError> {
        let key = key.validated()?;
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity }.into());
        }
        metrics::counter!("cart_operations_total", "operation" => "update").increment(1);

        let cart = self.load_existing(user_id).await?;
        let result = self
            .handler
            .execute(cart, |cart| cart.update_quantity(&key, quantity))
            .await?;

        Ok(result.document.doc.into_items())
    }

    /// Removes a line.
    ///
    /// Fails if the user has no cart, but a key that matches no line is not
    /// an error.
    #[tracing::instrument(skip(self))]
    pub async fn remove(&self, user_id: UserId, key: ItemKey) -> Result<Vec<CartItem>, DomainError> {
        let key = key.validated()?;
        metrics::counter!("cart_operations_total", "operation" => "remove").increment(1);

        let cart = self.load_existing(user_id).await?;
        let result = self
            .handler
            .execute(cart, |cart| {
                if !cart.remove_item(&key) {
                    tracing::debug!(%key, "remove matched no cart line");
                }
                Ok::<_, CartError>(())
            })
            .await?;

        Ok(result.document.doc.into_items())
    }

    /// Empties the cart if there is one. Always returns an empty list.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<Vec<CartItem>, DomainError> {
        metrics::counter!("cart_operations_total", "operation" => "clear").increment(1);

        if let Some(cart) = self.handler.load_one(&Cart::filter_for(user_id)).await?
            && !cart.doc.is_empty()
        {
            self.handler
                .execute(cart, |cart| {
                    cart.clear();
                    Ok::<_, CartError>(())
                })
                .await?;
        }

        Ok(Vec::new())
    }

    /// Merges a batch of items into the cart, creating it if needed.
    ///
    /// Items are merged in the given order with the same rule as
    /// [`add`](Self::add) and the cart is written once at the end. The whole
    /// batch is validated before anything is loaded.
    #[tracing::instrument(skip(self, items), fields(count = items.len()))]
    pub async fn sync(
        &self,
        user_id: UserId,
        items: Vec<CartItem>,
    ) -> Result<Vec<CartItem>, DomainError> {
        let items = items
            .into_iter()
            .map(CartItem::validated)
            .collect::<Result<Vec<_>, _>>()?;
        metrics::counter!("cart_operations_total", "operation" => "sync").increment(1);

        let cart = self
            .handler
            .load_or_create(&Cart::filter_for(user_id), || Cart::new(user_id))
            .await?;
        let result = self
            .handler
            .execute(cart, |cart| {
                cart.merge_items(items);
                Ok::<_, CartError>(())
            })
            .await?;

        Ok(result.document.doc.into_items())
    }

    async fn load_existing(
        &self,
        user_id: UserId,
    ) -> Result<record_store::Stored<Cart>, DomainError> {
        self.handler
            .load_one(&Cart::filter_for(user_id))
            .await?
            .ok_or_else(|| CartError::CartNotFound { user_id }.into())
    }
}
