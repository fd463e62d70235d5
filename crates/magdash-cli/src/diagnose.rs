use magdash_db::HostedClient;

/// Run the connectivity checks and print one line per check.
///
/// # Errors
///
/// Returns an error when any check failed, so scripts can act on the exit
/// status.
pub(crate) async fn run_diagnose(client: &HostedClient) -> anyhow::Result<()> {
    let results = magdash_db::run_diagnostics(client).await;
    for result in &results {
        println!("{result}");
    }

    let failed = results.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} checks failed", results.len());
    }
    println!("all {} checks passed", results.len());
    Ok(())
}
