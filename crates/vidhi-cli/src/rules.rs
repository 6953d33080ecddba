//! # Rules Subcommand
//!
//! - `rules jurisdictions`: Fees, stamp paper and attestation per state.
//! - `rules categories`: Regulatory categories with citations.
//! - `rules appeal-grounds`: Appeal reason codes.
//! - `rules export <DIR>`: Write the embedded tables as editable YAML.
//! - `rules check`: Load the configured tables and report warnings.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use vidhi_core::DocumentKind;
use vidhi_rules::export_embedded;

use crate::{OutputFormat, Session};

#[derive(Args, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// List jurisdiction profiles.
    Jurisdictions {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List regulatory categories.
    Categories {
        /// Only categories that apply to this document kind.
        #[arg(long)]
        kind: Option<String>,
    },
    /// List appeal reason codes.
    AppealGrounds,
    /// Write the embedded rule tables to a directory.
    Export { dir: PathBuf },
    /// Load the configured rule tables and report warnings.
    Check,
}

pub fn run_rules(args: &RulesArgs, session: &Session) -> Result<u8> {
    let rules = session.rules();
    match &args.command {
        RulesCommand::Jurisdictions { format } => {
            let profiles: Vec<_> = rules.jurisdictions().collect();
            if *format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&profiles)?);
                return Ok(0);
            }
            for p in profiles {
                println!("{} ({})", p.name, p.id);
                for kind in DocumentKind::ALL {
                    let fee = p.fee_for(kind).map_or_else(|| "none".to_string(), |f| format!("Rs. {f}"));
                    let stamp = p
                        .stamp_paper_for(kind)
                        .map_or_else(|| "none".to_string(), |v| format!("Rs. {v}"));
                    println!("  {kind}: fee {fee}, stamp paper {stamp}");
                }
                println!("  Payment modes: {}", p.payment_modes_joined());
                println!("  Languages: {}", p.languages.join(", "));
                println!("  Attestation: {}, witness required: {}", p.notarization, p.witness_required);
            }
        }
        RulesCommand::Categories { kind } => {
            let kind = kind.as_deref().map(DocumentKind::from_name).transpose()?;
            for c in rules.categories() {
                if kind.is_some_and(|k| !c.document_kinds.contains(&k)) {
                    continue;
                }
                println!("{} [{}] {}", c.id, c.severity.as_str(), c.name);
                println!("  {}", c.citation);
            }
        }
        RulesCommand::AppealGrounds => {
            for g in rules.appeal_grounds() {
                println!("{} ({}) {}", g.code, g.requires.as_str(), g.label);
            }
        }
        RulesCommand::Export { dir } => {
            let written = export_embedded(dir).with_context(|| format!("failed to export rules to {}", dir.display()))?;
            for path in written {
                println!("OK: wrote {}", path.display());
            }
        }
        RulesCommand::Check => {
            println!("Rules: {}", rules.digest());
            println!(
                "  {} jurisdictions, {} categories, {} clauses, {} appeal grounds",
                rules.jurisdictions().count(),
                rules.categories().count(),
                rules.clauses().len(),
                rules.appeal_grounds().count()
            );
            for warning in rules.warnings() {
                println!("  WARNING: {warning}");
            }
        }
    }
    Ok(0)
}
