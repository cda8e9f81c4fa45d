use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;

use atelier_domain::id::{ItemId, UserId};

use crate::domain::types::Cart;
use crate::error::StoreServiceError;
use crate::handlers::guard::AuthenticatedUser;
use crate::state::AppState;
use crate::usecase::cart::ShowCartUseCase;
use crate::usecase::settlement::{PurchaseUseCase, SettlementEngine};

/// Cart view. Field names are part of the public API.
#[derive(Serialize)]
pub struct CartResponse {
    pub name: String,
    pub money: i64,
    pub clothes_id: Vec<ItemId>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            name: cart.name,
            money: cart.balance,
            clothes_id: cart.items,
        }
    }
}

// ── POST /v1/cart/{item_id} ──────────────────────────────────────────────────

pub async fn purchase_item(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(item_id): Path<i64>,
) -> Result<impl IntoResponse, StoreServiceError> {
    let usecase = PurchaseUseCase {
        catalog: state.catalog_repo(),
        engine: SettlementEngine {
            settlements: state.settlement_repo(),
            allow_overdraft: state.policy.allow_overdraft,
        },
    };
    let receipt = usecase.execute(user.id, ItemId(item_id)).await?;
    Ok(Json(serde_json::json!({
        "message": "item was added to your cart",
        "balance": receipt.balance,
    })))
}

// ── GET /v1/cart ─────────────────────────────────────────────────────────────

pub async fn show_cart(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, StoreServiceError> {
    let usecase = ShowCartUseCase {
        carts: state.cart_repo(),
    };
    let cart = usecase.execute(user.id).await?;
    Ok(Json(CartResponse::from(cart)))
}

// ── GET /v1/users/{id}/cart ──────────────────────────────────────────────────

pub async fn show_user_cart(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, StoreServiceError> {
    let usecase = ShowCartUseCase {
        carts: state.cart_repo(),
    };
    let cart = usecase.execute(UserId(id)).await?;
    Ok(Json(CartResponse::from(cart)))
}
