#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agency_cli::cli::run().await
}
