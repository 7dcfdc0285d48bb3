use anyhow::{Context, Result};
use followgraph_common::observability::{LogConfig, init_logging};
use followgraph_config::{RunConfig, RunConfigLoader, load_credentials};
use followgraph_pipeline::{
    CollectOptions, build_report, collect_followees, read_seed_usernames, write_report,
};
use followgraph_social::twitter::build_client;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1) Load config (env wins)
    let cfg: RunConfig = RunConfigLoader::new()
        .with_optional_file("followgraph.yaml")
        .load()
        .context("loading followgraph.yaml")?;

    let log_path = init_logging(LogConfig::default())?;
    tracing::info!(log = %log_path.display(), data_dir = %cfg.data_dir.display(), "followgraph.start");

    // 2) Seeds and credentials
    let seeds_path = cfg.seeds_path();
    let seeds = read_seed_usernames(&seeds_path)
        .with_context(|| format!("reading seeds from {}", seeds_path.display()))?;
    let credentials = load_credentials(&cfg.credentials_file)?;
    let (client, user_auth) = build_client(&credentials, &cfg.api_base)?;
    tracing::info!(
        seeds = seeds.len(),
        user_auth,
        fields = ?cfg.user_fields,
        "followgraph.client.connected"
    );

    // 3) Collect, rank, write
    let options = CollectOptions::from_config(&cfg);
    let collected = collect_followees(&client, &seeds, &options)
        .await
        .context("collecting followees")?;

    let table = build_report(collected.raw, &options.fields);
    let report_path = cfg.report_path();
    write_report(&table, &report_path)
        .with_context(|| format!("writing report to {}", report_path.display()))?;

    tracing::info!(
        rows = table.rows.len(),
        report = %report_path.display(),
        "followgraph.done"
    );
    Ok(())
}
