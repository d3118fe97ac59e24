#[tokio::main]
async fn main() -> anyhow::Result<()> {
    curate::start_server().await
}
