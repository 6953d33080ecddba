//! # Document Subcommands
//!
//! `detect`, `validate` and `generate` over an input file. A blocked
//! input exits with [`EXIT_BLOCKED`] after printing its findings.
//! `recommend` suggests a document kind from a description of the need.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use vidhi_core::DocumentKind;
use vidhi_engine::{Assessment, GenerationOutcome, Recommendation, ValidationFinding};

use crate::{load_input, OutputFormat, Session, EXIT_BLOCKED};

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Text to scan.
    pub text: String,
    /// Document kind whose categories are considered.
    #[arg(long, default_value = "rti_application")]
    pub kind: String,
}

#[derive(Args, Debug)]
pub struct RecommendArgs {
    /// What the document is for, in your own words.
    pub description: String,
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Application input (YAML or JSON).
    pub input: PathBuf,
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Application input (YAML or JSON).
    pub input: PathBuf,
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
    /// Write the document text to this file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Store the document as a DRAFTED record.
    #[arg(long)]
    pub record: bool,
    /// Print the clause-by-clause explanation after the document.
    #[arg(long)]
    pub explain: bool,
}

pub fn run_detect(args: &DetectArgs, session: &Session) -> Result<u8> {
    let kind = DocumentKind::from_name(&args.kind)?;
    let matches = session.engine().detect(&args.text, kind);
    if matches.is_empty() {
        println!("No categories detected.");
        return Ok(0);
    }
    let rules = session.rules();
    for m in &matches {
        let name = rules.category(&m.category_id).map_or("", |c| c.name.as_str());
        println!("{} ({name}): {}", m.category_id, m.matched_keywords.join(", "));
    }
    Ok(0)
}

pub fn run_recommend(args: &RecommendArgs, session: &Session) -> Result<u8> {
    let recommendation = session.engine().recommend(&args.description);
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&recommendation)?),
        OutputFormat::Text => print_recommendation(&recommendation),
    }
    Ok(0)
}

fn print_recommendation(r: &Recommendation) {
    match (r.is_confident(), r.kind) {
        (true, Some(kind)) => {
            println!("Recommended: {kind} (confidence {}%)", r.confidence);
            if let Some(approach) = &r.approach {
                println!("{approach}");
            }
        }
        (_, Some(kind)) => println!("Not sure; closest match is {kind} (confidence {}%).", r.confidence),
        (_, None) => println!("No document kind matched the description."),
    }
    if !r.options.is_empty() {
        println!("What is the main purpose of your document?");
        for option in &r.options {
            println!("  {}: {}", option.kind, option.purpose);
        }
    }
    for score in r.scores.iter().filter(|s| s.score > 0) {
        println!("Score: {} {} ({})", score.kind, score.score, score.matched_keywords.join(", "));
    }
}

pub fn run_validate(args: &ValidateArgs, session: &Session) -> Result<u8> {
    let input = load_input(&args.input)?;
    let assessment = session.engine().validate(&input);
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&assessment)?),
        OutputFormat::Text => print_assessment(&assessment),
    }
    Ok(if assessment.result.is_blocked() { EXIT_BLOCKED } else { 0 })
}

pub fn run_generate(args: &GenerateArgs, session: &Session) -> Result<u8> {
    let input = load_input(&args.input)?;
    let generated = match session.engine().generate(&input)? {
        GenerationOutcome::Generated(doc) => *doc,
        GenerationOutcome::Blocked(assessment) => {
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&assessment)?),
                OutputFormat::Text => print_assessment(&assessment),
            }
            return Ok(EXIT_BLOCKED);
        }
    };

    let text = generated.document.to_text();
    let report = generated.explanation();
    if let Some(path) = &args.output {
        std::fs::write(path, &text).with_context(|| format!("failed to write {}", path.display()))?;
    }

    match args.format {
        OutputFormat::Json => {
            let body = json!({
                "id": generated.id,
                "generated_at": generated.generated_at,
                "verdict": generated.result.verdict,
                "document": generated.document,
                "explanation": report,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            if args.output.is_none() {
                println!("{text}");
                println!();
            }
            println!("Document: {}", generated.id);
            if args.explain {
                println!();
                print!("{report}");
            } else {
                print_findings(&generated.result.findings);
            }
        }
    }

    if args.record {
        let record = session.manager().create_record(generated, None)?;
        eprintln!("OK: recorded {} in {} state", record.id, record.stored_state());
    }
    Ok(0)
}

fn print_assessment(assessment: &Assessment) {
    println!("Verdict: {}", assessment.result.verdict);
    println!("Complexity: {} ({})", assessment.complexity.total, assessment.complexity.level);
    for m in &assessment.matches {
        println!("Category: {} ({})", m.category_id, m.matched_keywords.join(", "));
    }
    print_findings(&assessment.result.findings);
}

fn print_findings(findings: &[ValidationFinding]) {
    for f in findings {
        let field = f.field.as_deref().map(|field| format!(" {field}:")).unwrap_or_default();
        println!("  [{}] {}{field} {}", f.severity.as_str(), f.rule_id, f.message);
        if let Some(remediation) = &f.remediation {
            println!("      {remediation}");
        }
    }
}
