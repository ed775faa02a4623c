//! Networks command - list, create, attach and detach networks

use super::{connect_signed_in, or_dash, print_json, resolve_format};
use crate::audit::{AuditEvent, AuditLog};
use crate::cli::args::{FormatArgs, NetworksAction, NetworksArgs, OutputFormat};
use crate::config::Config;
use crate::error::LaunchpadResult;
use crate::ui::{self, Table, UiContext};
use serde_json::json;

pub async fn execute(args: NetworksArgs, config: &Config) -> LaunchpadResult<()> {
    let api = connect_signed_in(config).await?;
    let ctx = UiContext::detect();

    match args.action.unwrap_or(NetworksAction::List(FormatArgs::default())) {
        NetworksAction::List(format) => {
            let networks = api.list_networks().await?.into_items();
            match resolve_format(format.format, config) {
                OutputFormat::Json => print_json(&networks)?,
                OutputFormat::Plain => networks.iter().for_each(|n| println!("{}\t{}", n.id, n.name)),
                OutputFormat::Table if networks.is_empty() => ui::step_info(&ctx, "No networks"),
                OutputFormat::Table => {
                    let mut table = Table::new(["ID", "NAME", "CIDR"]);
                    for network in &networks {
                        table.row([
                            network.id.to_string(),
                            network.name.clone(),
                            or_dash(network.cidr.as_deref()).to_string(),
                        ]);
                    }
                    table.print();
                }
            }
        }
        NetworksAction::Create { name } => {
            let network = api.create_network(&name).await?;
            ui::step_ok(&ctx, &format!("Created network {} (id {})", network.name, network.id));
        }
        NetworksAction::Attach { service, network } => {
            api.attach_network(service, network).await?;
            AuditLog::new(config)
                .record(
                    AuditEvent::NetworkAttach,
                    json!({ "service": service, "network": network }),
                )
                .await;
            ui::step_ok(&ctx, &format!("Attached network {} to service {}", network, service));
        }
        NetworksAction::Detach { service, network } => {
            api.detach_network(service, network).await?;
            AuditLog::new(config)
                .record(
                    AuditEvent::NetworkDetach,
                    json!({ "service": service, "network": network }),
                )
                .await;
            ui::step_ok(&ctx, &format!("Detached network {} from service {}", network, service));
        }
    }
    Ok(())
}
