#[tokio::main]
async fn main() -> anyhow::Result<()> {
    league_manager_lib::run().await
}
