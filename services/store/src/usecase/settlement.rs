use atelier_domain::id::{ItemId, UserId};

use crate::domain::repository::{CatalogPort, SettlementRepository};
use crate::domain::types::{Purchase, Receipt};
use crate::error::StoreServiceError;

// ── Settlement Engine ────────────────────────────────────────────────────────

/// Owns the balance-debit-plus-cart-line unit of work.
pub struct SettlementEngine<S: SettlementRepository> {
    pub settlements: S,
    pub allow_overdraft: bool,
}

impl<S: SettlementRepository> SettlementEngine<S> {
    pub async fn purchase(&self, purchase: Purchase) -> Result<Receipt, StoreServiceError> {
        match self
            .settlements
            .settle(&purchase, self.allow_overdraft)
            .await
        {
            Ok(receipt) => {
                tracing::info!(
                    user_id = %purchase.user_id,
                    item_id = %purchase.item_id,
                    price = purchase.price,
                    balance = receipt.balance,
                    "purchase settled"
                );
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %purchase.user_id,
                    item_id = %purchase.item_id,
                    kind = e.kind(),
                    "purchase rejected"
                );
                Err(e)
            }
        }
    }
}

// ── Purchase ─────────────────────────────────────────────────────────────────

/// Resolves the catalog price at call time, then settles.
pub struct PurchaseUseCase<C: CatalogPort, S: SettlementRepository> {
    pub catalog: C,
    pub engine: SettlementEngine<S>,
}

impl<C: CatalogPort, S: SettlementRepository> PurchaseUseCase<C, S> {
    pub async fn execute(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<Receipt, StoreServiceError> {
        let price = self
            .catalog
            .price_of(item_id)
            .await?
            .ok_or(StoreServiceError::ItemNotFound)?;

        self.engine
            .purchase(Purchase {
                user_id,
                item_id,
                price,
            })
            .await
    }
}
