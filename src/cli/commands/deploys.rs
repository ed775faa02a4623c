//! Deploys command - upload artifacts and control deploys

use super::{connect_signed_in, or_dash, print_json, resolve_format};
use crate::api::{Deploy, PlatformApi};
use crate::artifact::Artifact;
use crate::audit::{AuditEvent, AuditLog};
use crate::cli::args::{DeploysAction, DeploysArgs, FormatArgs, OutputFormat};
use crate::config::Config;
use crate::error::LaunchpadResult;
use crate::ui::{self, format_size, status_style, Table, TaskSpinner, UiContext, UploadProgress};
use serde_json::json;
use std::path::Path;

pub async fn execute(args: DeploysArgs, config: &Config) -> LaunchpadResult<()> {
    match args.action {
        DeploysAction::List {
            service,
            page,
            format,
        } => list(service, page, format, config).await,
        DeploysAction::Upload {
            service,
            artifact,
            comment,
            start,
        } => upload(service, &artifact, comment.as_deref(), start, config).await,
        DeploysAction::Start { id } => {
            let api = connect_signed_in(config).await?;
            start_deploy(&api, id, config).await
        }
        DeploysAction::Stop { id } => stop(id, config).await,
    }
}

async fn list(
    service: u64,
    page: Option<u32>,
    args: FormatArgs,
    config: &Config,
) -> LaunchpadResult<()> {
    let api = connect_signed_in(config).await?;
    let deploys = api.list_deploys(service, page).await?.into_items();

    match resolve_format(args.format, config) {
        OutputFormat::Json => print_json(&deploys)?,
        OutputFormat::Plain => deploys.iter().for_each(|d| println!("{}\t{}", d.id, d.status)),
        OutputFormat::Table if deploys.is_empty() => {
            let ctx = UiContext::detect();
            ui::step_info(&ctx, &format!("Service {} has no deploys", service));
        }
        OutputFormat::Table => print_table(&deploys),
    }
    Ok(())
}

pub(crate) fn print_table(deploys: &[Deploy]) {
    let mut table = Table::new(["ID", "STATUS", "CREATED", "COMMENT"]);
    for deploy in deploys {
        let status = deploy.status.to_string();
        let created = deploy
            .created_at
            .map(|c| c.format("%Y-%m-%d %H:%M").to_string());
        table.row([
            deploy.id.to_string(),
            status_style(&status).to_string(),
            or_dash(created.as_deref()).to_string(),
            or_dash(deploy.comment.as_deref()).to_string(),
        ]);
    }
    table.print();
}

async fn upload(
    service: u64,
    path: &Path,
    comment: Option<&str>,
    start: bool,
    config: &Config,
) -> LaunchpadResult<()> {
    let ctx = UiContext::detect();
    let artifact = Artifact::load(path).await?;
    let api = connect_signed_in(config).await?;

    ui::intro(&ctx, &format!("Deploy to service {}", service));
    ui::key_value(&ctx, "artifact", artifact.file_name());
    ui::key_value(&ctx, "size", &format_size(artifact.size()));
    ui::key_value(&ctx, "sha256", artifact.sha256());

    let progress = UploadProgress::new(&ctx, artifact.file_name(), artifact.size());
    let uploaded = api.upload_deploy(service, &artifact, comment).await;
    progress.finish();
    let deploy = uploaded?;

    AuditLog::new(config)
        .record(
            AuditEvent::DeployUpload,
            json!({
                "service": service,
                "deploy": deploy.id,
                "artifact": artifact.file_name(),
                "size": artifact.size(),
                "sha256": artifact.sha256(),
            }),
        )
        .await;
    ui::step_ok_detail(&ctx, &format!("Uploaded deploy {}", deploy.id), &deploy.status.to_string());

    if start {
        start_deploy(&api, deploy.id, config).await?;
    } else {
        ui::remark(&ctx, &format!("Start it with: launchpad deploys start {}", deploy.id));
    }
    ui::outro_success(&ctx, "Done");
    Ok(())
}

async fn start_deploy(api: &PlatformApi, id: u64, config: &Config) -> LaunchpadResult<()> {
    let ctx = UiContext::detect();
    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Starting deploy {}...", id));
    let deploy = match api.start_deploy(id).await {
        Ok(deploy) => deploy,
        Err(e) => {
            spinner.stop_error("Deploy did not start");
            return Err(e);
        }
    };
    spinner.stop(&format!("Deploy {} is {}", deploy.id, deploy.status));

    AuditLog::new(config)
        .record(AuditEvent::DeployStart, json!({ "deploy": id }))
        .await;
    Ok(())
}

async fn stop(id: u64, config: &Config) -> LaunchpadResult<()> {
    let ctx = UiContext::detect();
    let api = connect_signed_in(config).await?;

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Stopping deploy {}...", id));
    let deploy = match api.stop_deploy(id).await {
        Ok(deploy) => deploy,
        Err(e) => {
            spinner.stop_error("Deploy did not stop");
            return Err(e);
        }
    };
    spinner.stop(&format!("Deploy {} is {}", deploy.id, deploy.status));

    AuditLog::new(config)
        .record(AuditEvent::DeployStop, json!({ "deploy": id }))
        .await;
    Ok(())
}
