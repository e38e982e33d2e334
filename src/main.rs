use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    pptmaker_cli::run_cli().await
}
