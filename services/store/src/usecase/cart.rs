use atelier_domain::id::UserId;

use crate::domain::repository::CartRepository;
use crate::domain::types::Cart;
use crate::error::StoreServiceError;

pub struct ShowCartUseCase<C: CartRepository> {
    pub carts: C,
}

impl<C: CartRepository> ShowCartUseCase<C> {
    pub async fn execute(&self, user_id: UserId) -> Result<Cart, StoreServiceError> {
        self.carts
            .cart_of(user_id)
            .await?
            .ok_or(StoreServiceError::UserNotFound)
    }
}
