use colored::Colorize;
use vpcflow_cloud::{Orchestrator, ProvisionReport, RunLedger, StateManager};
use vpcflow_cloud_gcp::{GcpCompute, acquire_access_token};
use vpcflow_config::{ConflictPolicy, ProvisionConfig};

pub async fn handle(config: &ProvisionConfig, state: &StateManager) -> anyhow::Result<()> {
    println!("{}", "Provisioning...".blue());
    println!("  → Project: {}", config.project_id.cyan());
    println!(
        "  → Region/Zone: {} / {}",
        config.region.cyan(),
        config.zone.cyan()
    );
    if config.on_conflict == ConflictPolicy::Adopt {
        println!("  → Existing resources: {}", config.on_conflict.to_string().yellow());
    }

    // No remote call is made without a token
    let token = acquire_access_token()
        .await
        .map_err(vpcflow_cloud::CloudError::from)?;
    let api = GcpCompute::new(&config.project_id, token)?;

    let mut ledger = RunLedger::new(&config.project_id);
    let result = Orchestrator::new(&api, config).run(&mut ledger).await;

    if let Err(e) = state.save(&ledger).await {
        tracing::warn!("Could not write run state: {}", e);
    }

    match result {
        Ok(report) => {
            print_report(&report);
            println!();
            println!("{}", "✓ Provisioning complete".green().bold());
            println!("  {}", ledger.summary());
            Ok(())
        }
        Err(e) => {
            println!(
                "{} {}",
                "✗ Provisioning stopped at".red().bold(),
                ledger.phase.to_string().red()
            );
            Err(e.into())
        }
    }
}

fn print_report(report: &ProvisionReport) {
    let lines = [
        ("Network", &report.network.name, &report.network.path),
        ("Subnetwork", &report.subnet.name, &report.subnet.path),
        ("Firewall", &report.ssh_rule.name, &report.ssh_rule.path),
        ("Firewall", &report.web_rule.name, &report.web_rule.path),
        ("Instance", &report.instance.name, &report.instance.path),
    ];
    for (kind, name, path) in lines {
        println!("  {} {} {}", "✓".green(), kind, name.cyan());
        println!("    {}", path.dimmed());
    }

    if let Some(operation) = &report.instance.operation {
        println!("  → Instance operation: {}", operation.cyan());
    }
    if let Some(id) = &report.instance.target_id {
        println!("  → Instance id: {}", id.cyan());
    }
}
