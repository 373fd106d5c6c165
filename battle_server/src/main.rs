use hazard_snake::{config::Config, init_tracing, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    server::serve(config).await
}
