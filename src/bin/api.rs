use gitlab_unfurly::api::handler;
use gitlab_unfurly::core::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    // Missing variables are reported per invocation by the handler.
    let debug = AppConfig::from_env().is_ok_and(|config| config.debug);
    gitlab_unfurly::setup_logging(debug);
    lambda_runtime::run(lambda_runtime::service_fn(handler)).await
}
