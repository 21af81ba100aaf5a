#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = auditdeck_rust::run().await {
        eprintln!("auditdeck-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
