use p2p_auction::config::Config;
use p2p_auction::{init_logging, run_app, StartupError};

#[actix_web::main]
async fn main() -> Result<(), StartupError> {
    init_logging();
    let config = Config::from_env()?;
    run_app(config).await
}
