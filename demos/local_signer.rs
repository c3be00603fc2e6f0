use hypersdk::prelude::*;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let client = HyperClient::new(ClientConfig::from_env()?)?;

    // a throwaway key, the recipient comes from the command line
    let signer = client.connect(SignerParams::Ephemeral).await?;
    println!("signing with {}", hex::encode(signer.public_key()?));

    let to = std::env::args().nth(1).ok_or_else(|| eyre::format_err!("usage: local_signer <address>"))?;
    let transfer = client.transfer_action(&to, "0.001", "sent from local_signer")?;

    // dry run first, no signer involved
    let result = client.simulate(&transfer, &to).await?;
    println!("simulated: {}", serde_json::to_string(&result)?);

    match client.send_transaction(vec![transfer]).await? {
        Some(reply) => println!("submitted {}", reply.tx_id),
        None => println!("submitted"),
    }

    Ok(())
}
