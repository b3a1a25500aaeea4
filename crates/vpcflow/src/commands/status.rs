use colored::Colorize;
use vpcflow_cloud::StateManager;

pub async fn handle(state: &StateManager) -> anyhow::Result<()> {
    let Some(ledger) = state.load().await? else {
        println!("{}", "No runs recorded".yellow());
        println!("  state file: {}", state.state_path().display());
        return Ok(());
    };

    println!("Project: {}", ledger.project_id.cyan());
    println!(
        "Started: {}",
        ledger.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if ledger.is_success() {
        println!("Result: {}", "success".green());
    } else {
        println!("Result: {} (phase {})", "incomplete".red(), ledger.phase);
    }
    if let Some(failure) = &ledger.failure {
        println!("Error: {}", failure.red());
    }

    println!();
    for step in &ledger.steps {
        let marker = if step.adopted {
            "=".yellow()
        } else {
            "+".green()
        };
        println!("  {} {} {}", marker, step.kind, step.name.cyan());
        println!("    {}", step.path.dimmed());
    }
    println!();
    println!("{}", ledger.summary());

    Ok(())
}
