#[tokio::main]
async fn main() -> eyre::Result<()> {
    trial_gateway::gateway::run().await
}
