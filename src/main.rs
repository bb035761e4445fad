use anyhow::Result;
use webresearch::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
