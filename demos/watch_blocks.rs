use hypersdk::prelude::*;
use std::time::Duration;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let client = HyperClient::new(ClientConfig::from_env()?)?;
    let mut stream = client.watch_blocks().interval(Duration::from_millis(500)).stream().take(5);
    while let Some(block) = stream.next().await {
        println!("block {} ({}) at {}", block.height, block.block_id, block.timestamp);
    }

    Ok(())
}
