use anyhow::{Context, Result};
use uuid::Uuid;

use clawforge_audit::{verify_chain, AuditStore};

use crate::commands::NewRunArgs;
use crate::config::AppConfig;

/// `clawctl new-run`: registers a run in the audit database, generating a
/// fresh run id unless one was supplied.
pub fn handle_new_run(config: &AppConfig, args: &NewRunArgs) -> Result<i32> {
    let store = AuditStore::open(&config.db_path).context("failed to open audit database")?;
    let run_id = args.run.unwrap_or_else(Uuid::new_v4);
    let meta = args.meta.as_deref().map(serde_json::from_str).transpose().context("--meta must be valid JSON")?;

    store
        .create_run(run_id, args.actor.as_deref(), args.host.as_deref(), args.correlation.as_deref(), meta.as_ref())
        .context("failed to create run")?;

    println!("{run_id}");
    Ok(0)
}

/// `clawctl append-event --run --event`: appends one JSON event payload to
/// a run's hash-chained audit log.
pub fn handle_append_event(config: &AppConfig, run: Uuid, event: &str) -> Result<i32> {
    let store = AuditStore::open(&config.db_path).context("failed to open audit database")?;
    let payload = serde_json::from_str(event).context("--event must be valid JSON")?;
    let appended = store.append_event(run, payload).context("failed to append event")?;
    println!("{}", serde_json::json!({"seq": appended.seq, "eventId": appended.event_id, "hash": appended.hash}));
    Ok(0)
}

/// `clawctl list-events --run`: lists a run's audit events in chain order.
pub fn handle_list_events(config: &AppConfig, run: Uuid, json: bool) -> Result<i32> {
    let store = AuditStore::open(&config.db_path).context("failed to open audit database")?;
    let events = store.list_events(run).context("failed to list events")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else {
        for event in &events {
            println!("{:>6}  {}  {}", event.seq, event.event_id, event.hash);
        }
    }
    Ok(0)
}

/// `clawctl verify-run --run`: verifies a run's full audit chain.
pub fn handle_verify_run(config: &AppConfig, run: Uuid, json: bool) -> Result<i32> {
    let store = AuditStore::open(&config.db_path).context("failed to open audit database")?;
    let events = store.list_events(run).context("failed to list events")?;

    match verify_chain(&events) {
        Ok(()) => {
            if json {
                println!("{}", serde_json::json!({"run": run, "valid": true, "events": events.len()}));
            } else {
                println!("run {run}: chain valid ({} events)", events.len());
            }
            Ok(0)
        }
        Err(err) => {
            if json {
                println!("{}", serde_json::json!({"run": run, "valid": false, "error": err.to_string()}));
            } else {
                println!("run {run}: chain invalid — {err}");
            }
            Ok(3)
        }
    }
}
