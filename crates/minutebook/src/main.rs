//! `minutebook` - CLI for the minutes workflow
//!
//! This binary renders, reviews, stores and approves meeting minutes.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use clap::Parser;

use minutebook::cli::{
    ApproveCommand, AssistCommand, Cli, Command, ConfigCommand, CreateCommand, ExportCommand,
    RenderCommand, UpdateCommand,
};
use minutebook::{
    generate_document, init_logging, AssistRequest, Assistant, Caller, Config, GeneratedDocument,
    MinutesInput, MinutesService, Role, Storage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Render(cmd) => handle_render(&config, cmd).await,
        Command::Assist(cmd) => handle_assist(&config, &cmd).await,
        Command::Create(cmd) => handle_create(&config, &cmd),
        Command::Update(cmd) => handle_update(&config, &cmd),
        Command::Approve(cmd) => handle_approve(&config, &cmd),
        Command::List(cmd) => handle_list(&config, cmd.json),
        Command::Show(cmd) => handle_show(&config, cmd.id, cmd.json),
        Command::Export(cmd) => handle_export(&config, cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_service(config: &Config) -> anyhow::Result<MinutesService<Storage>> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("opening minutes database at {}", path.display()))?;
    Ok(MinutesService::new(storage, config.document.clone()))
}

fn read_input(path: &Path) -> anyhow::Result<MinutesInput> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    MinutesInput::from_json(&body).with_context(|| format!("parsing {}", path.display()))
}

fn assistant(config: &Config, external: bool) -> anyhow::Result<Assistant> {
    if external {
        Ok(Assistant::from_config(config)?)
    } else {
        Ok(Assistant::basic())
    }
}

fn write_document(document: &GeneratedDocument, output: Option<PathBuf>) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(&document.filename));
    std::fs::write(&path, &document.bytes)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} ({} bytes)", path.display(), document.bytes.len());
    if !document.review.issues.is_empty() {
        println!();
        println!("Outstanding issues:");
        for issue in &document.review.issues {
            println!("  - {issue}");
        }
    }
    Ok(())
}

async fn handle_render(config: &Config, cmd: RenderCommand) -> anyhow::Result<()> {
    let record = read_input(&cmd.input)?.into_record(Utc::now())?;
    let assistant = assistant(config, cmd.assist)?;
    let document = generate_document(&record, &assistant, &config.document).await?;
    write_document(&document, cmd.output)
}

async fn handle_assist(config: &Config, cmd: &AssistCommand) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(&cmd.input)
        .with_context(|| format!("reading {}", cmd.input.display()))?;
    let request: AssistRequest =
        serde_json::from_str(&body).with_context(|| format!("parsing {}", cmd.input.display()))?;

    let result = Assistant::from_config(config)?.review(&request).await;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Mode: {}", result.mode);
    println!();
    println!("Agenda");
    for (i, item) in result.agenda_items.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, item.item, item.speaker);
    }
    println!("Decisions");
    for (i, decision) in result.decisions.iter().enumerate() {
        println!(
            "  D-{}. {} [{} / {}]",
            i + 1,
            decision.decision,
            decision.responsible,
            decision.deadline
        );
    }
    if let Some(summary) = &result.executive_summary {
        println!();
        println!("Summary: {summary}");
    }
    if !result.issues.is_empty() {
        println!();
        println!("Issues");
        for issue in &result.issues {
            println!("  - {issue}");
        }
    }
    Ok(())
}

fn handle_create(config: &Config, cmd: &CreateCommand) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let caller = Caller::new(&cmd.user, cmd.role.into());
    let id = service.create(Some(&caller), read_input(&cmd.input)?)?;
    println!("Created minutes record {id}");
    Ok(())
}

fn handle_update(config: &Config, cmd: &UpdateCommand) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let caller = Caller::new(&cmd.user, cmd.role.into());
    let record = service.update(Some(&caller), cmd.id, read_input(&cmd.input)?)?;
    println!("Updated minutes record {} (status: {})", cmd.id, record.status);
    Ok(())
}

fn handle_approve(config: &Config, cmd: &ApproveCommand) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let image = std::fs::read(&cmd.signature)
        .with_context(|| format!("reading {}", cmd.signature.display()))?;
    let input = MinutesInput {
        chairman_signature: Some(format!("data:image/png;base64,{}", STANDARD.encode(image))),
        ..MinutesInput::default()
    };
    let caller = Caller::new(&cmd.user, Role::Chairman);
    let record = service.update(Some(&caller), cmd.id, input)?;
    println!("Minutes record {} is now {}", cmd.id, record.status);
    Ok(())
}

fn handle_list(config: &Config, json: bool) -> anyhow::Result<()> {
    let summaries = open_service(config)?.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No minutes recorded.");
        return Ok(());
    }
    println!(
        "{:>5}  {:<12}  {:<16}  {:<10}  {:<16}  TITLE",
        "ID", "DATE", "STATUS", "REF", "DEPARTMENT"
    );
    for s in summaries {
        println!(
            "{:>5}  {:<12}  {:<16}  {:<10}  {:<16}  {}",
            s.id, s.date, s.status, s.reference_number, s.department, s.title
        );
    }
    Ok(())
}

fn handle_show(config: &Config, id: i64, json: bool) -> anyhow::Result<()> {
    let record = open_service(config)?.get(id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("{} ({})", record.title, record.status);
    println!("  Reference:  {}", record.reference_number);
    println!("  Department: {}", record.department);
    println!("  When:       {} {} ({} min)", record.date, record.time, record.duration);
    println!("  Where:      {}", record.location);
    println!("  Type:       {}", record.meeting_type.label());
    println!("  Chairman:   {}", record.chairman);
    println!("  Secretary:  {}", record.secretary);
    println!("  Attendees:  {}", record.attendees.len());
    println!("  Agenda:     {} items", record.agenda_items.len());
    println!("  Decisions:  {}", record.decisions.len());
    if let Some(signed) = record.signature_timestamp {
        println!("  Signed:     {}", signed.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

async fn handle_export(config: &Config, cmd: ExportCommand) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let assistant = assistant(config, cmd.assist)?;
    let document = service.export(cmd.id, &assistant).await?;
    write_document(&document, cmd.output)
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Assist]");
                println!("  Enabled:            {}", config.assist.enabled);
                println!("  Endpoint:           {}", config.assist.endpoint);
                println!("  Model:              {}", config.assist.model);
                println!(
                    "  API key:            {}",
                    if config.assist.api_key.is_some() { "set" } else { "not set" }
                );
                println!("  Timeout (secs):     {}", config.assist.timeout_secs);
                println!();
                println!("[Document]");
                println!("  Label:              {}", config.document.confidential_label);
                println!("  Footer:             {}", config.document.footer_text);
                println!("  Filename prefix:    {}", config.document.filename_prefix);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
