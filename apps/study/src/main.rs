#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vocab_study::run().await
}
