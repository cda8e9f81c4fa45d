use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use atelier_core::health::healthz;
use atelier_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    cart::{purchase_item, show_cart, show_user_cart},
    guard::{require_activated, require_admin, require_authenticated, require_carts_read},
    health::readyz,
    token::{
        create_activation_token, create_authentication_token, create_password_reset_token,
        delete_authentication_tokens,
    },
    user::{activate_user, delete_user, register_user, reset_password},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Users
        .route("/v1/users", post(register_user))
        .route("/v1/users/activated", put(activate_user))
        .route("/v1/users/password", put(reset_password))
        // Tokens
        .route("/v1/tokens/authentication", post(create_authentication_token))
        .route("/v1/tokens/activation", post(create_activation_token))
        .route("/v1/tokens/password-reset", post(create_password_reset_token));

    let authenticated = Router::new()
        .route(
            "/v1/tokens/authentication",
            delete(delete_authentication_tokens),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_authenticated,
        ));

    let activated = Router::new()
        .route("/v1/cart", get(show_cart))
        .route("/v1/cart/{item_id}", post(purchase_item))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_activated,
        ));

    let admin = Router::new()
        .route("/v1/users/{id}", delete(delete_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let carts_read = Router::new()
        .route("/v1/users/{id}/cart", get(show_user_cart))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_carts_read,
        ));

    public
        .merge(authenticated)
        .merge(activated)
        .merge(admin)
        .merge(carts_read)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
