//! Services command - list, inspect, create, update and delete services

use super::{connect_signed_in, or_dash, print_json, resolve_format};
use crate::api::{Service, ServiceSpec};
use crate::audit::{AuditEvent, AuditLog};
use crate::cli::args::{FormatArgs, OutputFormat, ServicesAction, ServicesArgs};
use crate::config::Config;
use crate::error::{LaunchpadError, LaunchpadResult};
use crate::ui::{self, status_style, Table, TaskSpinner, UiContext};
use serde_json::json;

pub async fn execute(args: ServicesArgs, config: &Config) -> LaunchpadResult<()> {
    let action = args.action.unwrap_or(ServicesAction::List {
        page: None,
        format: FormatArgs::default(),
    });

    match action {
        ServicesAction::List { page, format } => list(page, format, config).await,
        ServicesAction::Show { id, format } => show(id, format, config).await,
        ServicesAction::Create { name, plan } => {
            create(ServiceSpec { name: Some(name), plan }, config).await
        }
        ServicesAction::Update { id, name, plan } => update(id, ServiceSpec { name, plan }, config).await,
        ServicesAction::Delete { id, yes } => delete(id, yes, config).await,
    }
}

async fn list(page: Option<u32>, args: FormatArgs, config: &Config) -> LaunchpadResult<()> {
    let api = connect_signed_in(config).await?;
    let listing = api.list_services(page).await?;
    let format = resolve_format(args.format, config);
    let ctx = UiContext::detect().plain_if(format != OutputFormat::Table);

    let total = listing.total();
    let has_next = listing.has_next();
    let services = listing.into_items();

    match format {
        OutputFormat::Json => print_json(&services)?,
        OutputFormat::Plain => services.iter().for_each(|s| println!("{}\t{}", s.id, s.name)),
        OutputFormat::Table if services.is_empty() => {
            ui::step_info(&ctx, "No services yet");
            ui::remark(&ctx, "Create one with: launchpad services create <name>");
        }
        OutputFormat::Table => {
            print_table(&services);
            println!();
            println!("{} of {} service(s)", services.len(), total);
            if has_next {
                let next = page.unwrap_or(1) + 1;
                ui::remark(&ctx, &format!("More results: launchpad services list --page {}", next));
            }
        }
    }
    Ok(())
}

fn print_table(services: &[Service]) {
    let mut table = Table::new(["ID", "NAME", "STATUS", "PLAN", "URL"]);
    for service in services {
        let status = service.status.to_string();
        table.row([
            service.id.to_string(),
            service.name.clone(),
            status_style(&status).to_string(),
            or_dash(service.plan.as_ref().map(|p| p.name.as_str())).to_string(),
            or_dash(service.url.as_deref()).to_string(),
        ]);
    }
    table.print();
}

async fn show(id: u64, args: FormatArgs, config: &Config) -> LaunchpadResult<()> {
    let api = connect_signed_in(config).await?;
    let service = api.get_service(id).await?;
    let format = resolve_format(args.format, config);

    match format {
        OutputFormat::Json => print_json(&service)?,
        OutputFormat::Plain => println!("{}\t{}\t{}", service.id, service.name, service.status),
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            ui::intro(&ctx, &format!("Service {}", service.name));
            let status = service.status.to_string();
            ui::key_value(&ctx, "id", &service.id.to_string());
            ui::key_value(&ctx, "status", &status_style(&status).to_string());
            ui::key_value(&ctx, "plan", or_dash(service.plan.as_ref().map(|p| p.name.as_str())));
            ui::key_value(&ctx, "url", or_dash(service.url.as_deref()));
            if let Some(created) = service.created_at {
                ui::key_value(&ctx, "created", &created.format("%Y-%m-%d %H:%M").to_string());
            }
            let networks: Vec<&str> = service.networks.iter().map(|n| n.name.as_str()).collect();
            let networks = if networks.is_empty() {
                "-".to_string()
            } else {
                networks.join(", ")
            };
            ui::key_value(&ctx, "networks", &networks);
        }
    }
    Ok(())
}

async fn create(spec: ServiceSpec, config: &Config) -> LaunchpadResult<()> {
    let ctx = UiContext::detect();
    let api = connect_signed_in(config).await?;

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start("Creating service...");
    let service = match api.create_service(&spec).await {
        Ok(service) => service,
        Err(e) => {
            spinner.stop_error("Service not created");
            return Err(e);
        }
    };
    spinner.stop(&format!("Created service {} (id {})", service.name, service.id));

    AuditLog::new(config)
        .record(
            AuditEvent::ServiceCreate,
            json!({ "id": service.id, "name": service.name }),
        )
        .await;
    Ok(())
}

async fn update(id: u64, spec: ServiceSpec, config: &Config) -> LaunchpadResult<()> {
    if spec.name.is_none() && spec.plan.is_none() {
        return Err(LaunchpadError::User(
            "Nothing to update; pass --name or --plan".to_string(),
        ));
    }

    let ctx = UiContext::detect();
    let api = connect_signed_in(config).await?;
    let service = api.update_service(id, &spec).await?;
    ui::step_ok(&ctx, &format!("Updated service {} (id {})", service.name, service.id));
    Ok(())
}

async fn delete(id: u64, yes: bool, config: &Config) -> LaunchpadResult<()> {
    let ctx = UiContext::detect().with_auto_yes(yes);
    let api = connect_signed_in(config).await?;

    let confirmed = ui::confirm(&ctx, &format!("Delete service {}?", id), false).await?;
    if !confirmed {
        ui::step_warn_hint(&ctx, "Service not deleted", "Pass --yes to skip confirmation");
        return Ok(());
    }

    api.delete_service(id).await?;
    AuditLog::new(config)
        .record(AuditEvent::ServiceDelete, json!({ "id": id }))
        .await;
    ui::step_ok(&ctx, &format!("Deleted service {}", id));
    Ok(())
}
