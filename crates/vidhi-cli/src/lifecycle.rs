//! # Lifecycle Subcommands
//!
//! Record transitions, status, appeals and deadlines over the record
//! directory. Record ids may be abbreviated to any unique prefix.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use vidhi_lifecycle::{DocumentRecord, LifecycleEvent, Urgency};

use crate::{OutputFormat, Session};

#[derive(Args, Debug)]
pub struct RecordIdArgs {
    /// Record id or a unique prefix of one.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Record id or prefix. Lists every record when omitted.
    pub id: Option<String>,
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct AppealArgs {
    /// Id or prefix of the RTI application to appeal.
    pub id: String,
    /// Appeal reason code (see `vidhi rules appeal-grounds`).
    #[arg(long)]
    pub reason: String,
    /// Write the appeal text to this file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DeadlinesArgs {
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

pub fn run_transition(args: &RecordIdArgs, event: LifecycleEvent, session: &Session) -> Result<u8> {
    let id = session.resolve_id(&args.id)?;
    let record = session.manager().transition(&id, event)?;
    let last = record.transitions().last().context("transition was not logged")?;
    println!("OK: {} {} -> {}", record.id, last.from_state, last.to_state);
    if event == LifecycleEvent::Submit {
        if let Some(d) = record.deadlines() {
            println!("  Reply due: {}", d.reply_deadline());
            println!("  Appeal by: {}", d.appeal_deadline());
        }
    }
    Ok(0)
}

pub fn run_status(args: &StatusArgs, session: &Session) -> Result<u8> {
    let now = session.now();
    let Some(raw) = &args.id else {
        let records = session.manager().records()?;
        if records.is_empty() {
            println!("No records found.");
        }
        for r in records {
            println!(
                "{}  {:<16} {:<15} {}",
                r.id,
                r.effective_state(now).as_str(),
                r.kind.as_str(),
                r.jurisdiction.as_str()
            );
        }
        return Ok(0);
    };

    let record = session.manager().get(&session.resolve_id(raw)?)?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => print_record(&record, session),
    }
    Ok(0)
}

fn print_record(record: &DocumentRecord, session: &Session) {
    let now = session.now();
    println!("Record: {}", record.id);
    println!("  Title: {}", record.document.title);
    println!("  State: {}", record.effective_state(now));
    println!("  Verdict: {}", record.verdict);
    println!("  Created: {}", record.created_at);
    if let Some(parent) = &record.parent_id {
        println!("  Appeals: {parent}");
    }
    if let Some(d) = record.deadlines() {
        let days = d.days_remaining(now);
        println!("  Submitted: {}", d.submitted_at());
        println!("  Reply due: {} ({days} days, {})", d.reply_deadline(), Urgency::classify(days));
        println!("  Appeal by: {}", d.appeal_deadline());
    }
    println!("  Transitions: {}", record.transitions().len());
    for (i, t) in record.transitions().iter().enumerate() {
        println!("    [{i}] {} -> {} ({}) at {}", t.from_state, t.to_state, t.event, t.timestamp);
    }
}

pub fn run_appeal(args: &AppealArgs, session: &Session) -> Result<u8> {
    let parent = session.resolve_id(&args.id)?;
    let appeal = session.manager().generate_appeal(&parent, &args.reason)?;
    let text = appeal.document.to_text();
    match &args.output {
        Some(path) => std::fs::write(path, &text).with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{text}\n"),
    }
    println!("OK: appeal {} filed against {parent}", appeal.id);
    Ok(0)
}

pub fn run_deadlines(args: &DeadlinesArgs, session: &Session) -> Result<u8> {
    let pending = session.manager().pending_deadlines(session.now())?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&pending)?),
        OutputFormat::Text => {
            if pending.is_empty() {
                println!("No pending deadlines.");
            }
            for p in &pending {
                println!(
                    "{}  {:<15} {:<14} {:<6} due {} ({} days, {})",
                    p.id,
                    p.kind.as_str(),
                    p.jurisdiction.as_str(),
                    p.deadline.as_str(),
                    p.due,
                    p.days_remaining,
                    p.urgency
                );
            }
        }
    }
    Ok(0)
}
