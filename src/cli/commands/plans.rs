//! Plans command - list and select pricing plans

use super::{connect_signed_in, or_dash, print_json, resolve_format};
use crate::api::Plan;
use crate::audit::{AuditEvent, AuditLog};
use crate::cli::args::{FormatArgs, OutputFormat, PlansAction, PlansArgs};
use crate::config::Config;
use crate::error::LaunchpadResult;
use crate::ui::{self, Table, TaskSpinner, UiContext};
use serde_json::json;

pub async fn execute(args: PlansArgs, config: &Config) -> LaunchpadResult<()> {
    match args.action.unwrap_or(PlansAction::List(FormatArgs::default())) {
        PlansAction::List(format) => list(format, config).await,
        PlansAction::Select { id } => select(id, config).await,
    }
}

async fn list(args: FormatArgs, config: &Config) -> LaunchpadResult<()> {
    let api = connect_signed_in(config).await?;
    let plans = api.list_plans().await?.into_items();

    match resolve_format(args.format, config) {
        OutputFormat::Json => print_json(&plans)?,
        OutputFormat::Plain => plans.iter().for_each(|p| println!("{}\t{}", p.id, p.name)),
        OutputFormat::Table if plans.is_empty() => {
            ui::step_info(&UiContext::detect(), "No plans available")
        }
        OutputFormat::Table => print_table(&plans),
    }
    Ok(())
}

fn print_table(plans: &[Plan]) {
    let mut table = Table::new(["ID", "NAME", "PRICE", "SERVICES", "DESCRIPTION"]);
    for plan in plans {
        let max_services = plan
            .max_services
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unlimited".to_string());
        table.row([
            plan.id.to_string(),
            plan.name.clone(),
            or_dash(plan.price.as_deref()).to_string(),
            max_services,
            or_dash(plan.description.as_deref()).to_string(),
        ]);
    }
    table.print();
}

async fn select(id: u64, config: &Config) -> LaunchpadResult<()> {
    let ctx = UiContext::detect();
    let api = connect_signed_in(config).await?;

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Selecting plan {}...", id));
    match api.select_plan(id).await {
        Ok(_) => spinner.stop(&format!("Plan {} selected", id)),
        Err(e) => {
            spinner.stop_error("Plan selection failed");
            return Err(e);
        }
    }

    AuditLog::new(config)
        .record(AuditEvent::PlanSelect, json!({ "plan": id }))
        .await;
    Ok(())
}
