pub mod create_user;
pub mod delete_user;
pub mod list_users;
pub mod update_user;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{error::ApiError, middleware::auth::token_auth_middleware, state::AppState};

pub const USERS_PATH: &str = "/users";
pub const USER_PATH: &str = "/users/{user_id}";

/// One method on the users resource, deployable as its own Lambda.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsersRoute {
    List,
    Create,
    Update,
    Delete,
}

impl UsersRoute {
    fn register(self, router: Router<AppState>) -> Router<AppState> {
        match self {
            UsersRoute::List => router.route(USERS_PATH, get(list_users::handler)),
            UsersRoute::Create => router.route(USERS_PATH, post(create_user::handler)),
            UsersRoute::Update => router.route(USER_PATH, put(update_user::handler)),
            UsersRoute::Delete => router.route(USER_PATH, delete(delete_user::handler)),
        }
    }
}

/// All four routes on one router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            USERS_PATH,
            get(list_users::handler).post(create_user::handler),
        )
        .route(
            USER_PATH,
            put(update_user::handler).delete(delete_user::handler),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            token_auth_middleware,
        ))
        .with_state(state)
}

/// A router serving only `route`.
pub fn single_route(route: UsersRoute, state: AppState) -> Router {
    route
        .register(Router::new())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            token_auth_middleware,
        ))
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}
