#[tokio::main]
async fn main() {
    if let Err(err) = dm_api::run().await {
        tracing::error!(error = %err, "dm-api failed");
        eprintln!("dm-api failed: {err}");
        std::process::exit(1);
    }
}
