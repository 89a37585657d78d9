use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    docmind_cli::main_entry().await
}
