//! Watch command - follow a service and its deploys until interrupted

use super::connect_signed_in;
use crate::audit::{AuditEvent, AuditLog};
use crate::cli::args::WatchArgs;
use crate::config::Config;
use crate::error::{LaunchpadError, LaunchpadResult};
use crate::poll::{DeployListSource, PollEvent, PollHandle, Poller, ServiceSource, StopReason, Update};
use crate::sync::{Snapshot, SnapshotCache};
use crate::ui::{self, status_style, UiContext};
use chrono::Local;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

pub async fn execute(args: WatchArgs, config: &Config) -> LaunchpadResult<()> {
    let ctx = UiContext::detect();
    let api = connect_signed_in(config).await?;
    let interval = Duration::from_secs(args.interval.unwrap_or(config.poll.interval_secs).max(1));

    ui::intro(&ctx, &format!("Watching service {}", args.service));
    ui::remark(&ctx, "Press Ctrl-C to stop");

    let cache = Arc::new(Mutex::new(SnapshotCache::new()));
    let mut service = Poller::spawn(
        Arc::new(ServiceSource::new(api.clone(), args.service)),
        cache.clone(),
        interval,
    );
    let mut deploys = Poller::spawn(
        Arc::new(DeployListSource::new(api, args.service)),
        cache,
        interval,
    );

    let outcome = follow(&mut service, &mut deploys).await;
    service.stop().await;
    deploys.stop().await;

    if let Err(LaunchpadError::SessionExpired) = outcome {
        AuditLog::new(config)
            .record(AuditEvent::SessionExpired, json!({ "service": args.service }))
            .await;
    }
    outcome?;
    ui::outro_success(&ctx, "Stopped watching");
    Ok(())
}

async fn follow(service: &mut PollHandle, deploys: &mut PollHandle) -> LaunchpadResult<()> {
    let mut deploy_states: Vec<(String, String)> = Vec::new();
    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = &mut interrupted => {
                debug!("Interrupted");
                return Ok(());
            }
            event = service.next_event() => match event {
                Some(PollEvent::Updated(Update::Entity(snapshot))) => print_service(&snapshot),
                Some(PollEvent::Failed(reason)) => print_failure("service", &reason),
                Some(PollEvent::Stopped(StopReason::SignedOut)) => {
                    return Err(LaunchpadError::SessionExpired)
                }
                Some(_) => {}
                None => return Ok(()),
            },
            event = deploys.next_event() => match event {
                Some(PollEvent::Updated(Update::List(list))) => {
                    let current: Vec<(String, String)> = list.iter().map(|d| deploy_state(d)).collect();
                    for (id, status) in changed_deploys(&deploy_states, &current) {
                        print_line(&format!("deploy {} {}", id, status_style(status)));
                    }
                    deploy_states = current;
                }
                Some(PollEvent::Failed(reason)) => print_failure("deploys", &reason),
                Some(PollEvent::Stopped(StopReason::SignedOut)) => {
                    return Err(LaunchpadError::SessionExpired)
                }
                Some(_) => {}
                None => return Ok(()),
            },
        }
    }
}

fn print_line(message: &str) {
    println!("{}  {}", console::style(Local::now().format("%H:%M:%S")).dim(), message);
}

fn print_service(snapshot: &Snapshot) {
    let name = snapshot.get("name").and_then(Value::as_str).unwrap_or("service");
    let status = snapshot.get("status").and_then(Value::as_str).unwrap_or("unknown");
    print_line(&format!("{} {}", name, status_style(status)));
}

fn print_failure(what: &str, reason: &str) {
    print_line(&format!(
        "{} {}",
        console::style(format!("{} refresh failed:", what)).yellow(),
        reason
    ));
}

/// Identifier and status of a cached deploy
fn deploy_state(deploy: &Value) -> (String, String) {
    let id = match deploy.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    };
    let status = deploy
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    (id, status)
}

/// Deploys that are new or whose status differs from `before`
fn changed_deploys<'a>(
    before: &[(String, String)],
    after: &'a [(String, String)],
) -> Vec<(&'a str, &'a str)> {
    after
        .iter()
        .filter(|(id, status)| {
            !before
                .iter()
                .any(|(prev_id, prev_status)| prev_id == id && prev_status == status)
        })
        .map(|(id, status)| (id.as_str(), status.as_str()))
        .collect()
}
