#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_shell::run().await
}
