use std::sync::Arc;

use lambda_runtime::{run, service_fn, tracing, Error, LambdaEvent};
use users_api::{
    authorizer::{handle, AuthorizerRequest, AuthorizerResponse, TokenAuthorizer},
    config::Config,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config = Config::from_env();
    let authorizer = TokenAuthorizer::new(config.authorizer_token_digests);
    if !authorizer.is_configured() {
        tracing::warn!("AUTHORIZER_TOKEN_SHA256 not set, every request will be denied");
    }
    let authorizer = Arc::new(authorizer);

    run(service_fn(move |event: LambdaEvent<AuthorizerRequest>| {
        let authorizer = Arc::clone(&authorizer);
        async move { Ok::<AuthorizerResponse, Error>(handle(&authorizer, &event.payload)) }
    }))
    .await
}
