use netval_server::{Config, Kernel};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    netval_telemetry::init_tracing("netval-server");

    let config = Config::from_env();
    let kernel = Kernel::ignite(config).await;
    kernel.serve().await;
}
