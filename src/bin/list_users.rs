use std::env::set_var;

use lambda_http::{run, tracing, Error};
use users_api::{
    config::Config,
    routes::{single_route, UsersRoute},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");

    let config = Config::from_env();
    let state = AppState::without_authorizer(&config).await;

    run(single_route(UsersRoute::List, state)).await
}
