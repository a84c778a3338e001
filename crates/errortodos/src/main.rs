//! `errtodo` - CLI for errortodos
//!
//! This binary provides the command-line interface for signing in and
//! managing error todos.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use errortodos::cli::{
    AddCommand, Cli, Command, ConfigCommand, ListCommand, OutputFormat, ShowCommand,
    TrackerCommand, UpdateCommand,
};
use errortodos::{
    init_logging, Config, ErrorRecord, ErrorRecordPatch, ImageAttachment, NewErrorRecord,
    RecordFilter, SignInForm, SignUpForm, Tracker,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<errortodos::Error>() {
                Some(e) if e.is_user_error() => eprintln!("{e}"),
                _ => eprintln!("error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.clone())?;

    match cli.into_command() {
        Command::Config(cmd) => handle_config(&config, cmd),
        Command::Tracker(cmd) => {
            let mut tracker = Tracker::open(config)?;
            handle_tracker(&mut tracker, cmd)
        }
    }
}

fn handle_tracker(tracker: &mut Tracker, command: TrackerCommand) -> anyhow::Result<()> {
    match command {
        TrackerCommand::Signup(cmd) => {
            let account = tracker.sign_up(&SignUpForm {
                name: cmd.name,
                email: cmd.email,
                password: cmd.password,
                confirm_password: cmd.confirm,
            })?;
            println!("Welcome, {}! You are signed in.", account.name);
        }
        TrackerCommand::Signin(cmd) => {
            let account = tracker.sign_in(&SignInForm {
                email: cmd.email,
                password: cmd.password,
            })?;
            println!(
                "Signed in as {} ({} error todos).",
                account.name,
                tracker.records().len()
            );
        }
        TrackerCommand::Logout => {
            tracker.logout()?;
            println!("Signed out.");
        }
        TrackerCommand::Whoami => match tracker.current_account() {
            Some(account) => println!("{} <{}>", account.name, account.email),
            None => println!("Not signed in."),
        },
        TrackerCommand::List(cmd) => handle_list(tracker, &cmd)?,
        TrackerCommand::Add(cmd) => {
            let new = new_record_from(tracker.config(), cmd)?;
            let record = tracker.add_record(new)?;
            println!("Added error todo {}", record.id);
        }
        TrackerCommand::Update(cmd) => {
            let id = cmd.id.clone();
            let patch = patch_from(tracker.config(), cmd)?;
            if patch.is_empty() {
                println!("Nothing to update.");
            } else {
                tracker.update_record(&id, &patch)?;
                println!("Updated error todo {id}");
            }
        }
        TrackerCommand::Toggle { id } => {
            let record = tracker.toggle_status(&id)?;
            println!("{} is now {}", record.title, record.status.label());
        }
        TrackerCommand::Delete { id } => {
            tracker.delete_record(&id)?;
            println!("Deleted error todo {id}");
        }
        TrackerCommand::Show(cmd) => handle_show(tracker, &cmd)?,
        TrackerCommand::Categories => {
            require_session(tracker)?;
            for category in tracker.categories() {
                println!("{category}");
            }
            let suggestions = tracker.suggested_categories();
            if !suggestions.is_empty() {
                println!();
                println!("Suggestions: {}", suggestions.join(", "));
            }
        }
        TrackerCommand::Status(cmd) => handle_status(tracker, cmd.json)?,
    }
    Ok(())
}

fn require_session(tracker: &Tracker) -> errortodos::Result<()> {
    if tracker.current_account().is_none() {
        return Err(errortodos::Error::NotSignedIn);
    }
    Ok(())
}

fn read_code(code: Option<String>, code_file: Option<&Path>) -> anyhow::Result<Option<String>> {
    match code_file {
        Some(path) => Ok(Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading code from {}", path.display()))?,
        )),
        None => Ok(code),
    }
}

fn load_image(config: &Config, path: &Path) -> errortodos::Result<String> {
    ImageAttachment::from_path(path, config.records.max_image_bytes)
        .map(ImageAttachment::into_data_url)
}

fn new_record_from(config: &Config, cmd: AddCommand) -> anyhow::Result<NewErrorRecord> {
    let code = read_code(cmd.code, cmd.code_file.as_deref())?.unwrap_or_default();
    let image = cmd
        .image
        .as_deref()
        .map(|path| load_image(config, path))
        .transpose()?;

    Ok(NewErrorRecord {
        title: cmd.title,
        description: cmd.description,
        repro_steps: cmd.steps.unwrap_or_default(),
        fix_notes: cmd.fix.unwrap_or_default(),
        code,
        status: cmd.status.into(),
        category: cmd.category.unwrap_or_default(),
        image,
    })
}

fn patch_from(config: &Config, cmd: UpdateCommand) -> anyhow::Result<ErrorRecordPatch> {
    let image = if cmd.remove_image {
        Some(None)
    } else {
        cmd.image
            .as_deref()
            .map(|path| load_image(config, path))
            .transpose()?
            .map(Some)
    };

    Ok(ErrorRecordPatch {
        title: cmd.title,
        description: cmd.description,
        repro_steps: cmd.steps,
        fix_notes: cmd.fix,
        code: read_code(cmd.code, cmd.code_file.as_deref())?,
        status: cmd.status.map(Into::into),
        category: cmd.category,
        image,
    })
}

fn handle_list(tracker: &Tracker, cmd: &ListCommand) -> anyhow::Result<()> {
    require_session(tracker)?;

    let filter = RecordFilter {
        search: cmd.search.clone().unwrap_or_default(),
        status: cmd.status.map(Into::into),
        category: cmd.category.clone().filter(|c| c != "all"),
    };
    let records = tracker.filtered(&filter);

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Plain => {
            for record in &records {
                println!("{}\t{}\t{}", record.id, record.status, record.title);
            }
        }
        OutputFormat::Table => {
            if records.is_empty() {
                println!("No error todos found.");
                return Ok(());
            }
            println!(
                "{:<36}  {:<11}  {:<12}  {:<10}  TITLE",
                "ID", "STATUS", "TYPE", "CREATED"
            );
            for record in &records {
                println!(
                    "{:<36}  {:<11}  {:<12}  {:<10}  {}",
                    record.id,
                    record.status.label(),
                    record.category,
                    record.created_at.format("%Y-%m-%d"),
                    record.title
                );
            }
            println!();
            println!(
                "{} of {} error todos",
                records.len(),
                tracker.records().len()
            );
        }
    }
    Ok(())
}

fn handle_show(tracker: &Tracker, cmd: &ShowCommand) -> anyhow::Result<()> {
    require_session(tracker)?;
    let record = tracker
        .record(&cmd.id)
        .ok_or_else(|| errortodos::Error::not_found(&cmd.id))?;

    if let Some(out) = &cmd.image_out {
        let data_url = record
            .image
            .as_deref()
            .context("this error todo has no screenshot")?;
        let image = ImageAttachment::from_data_url(data_url)?;
        let out = if out.extension().is_some() {
            out.clone()
        } else {
            out.with_extension(image.extension())
        };
        std::fs::write(&out, image.decode()?)
            .with_context(|| format!("writing {}", out.display()))?;
        if !cmd.json {
            println!("Saved screenshot to {}", out.display());
        }
    }

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        print_record(record);
    }
    Ok(())
}

fn print_record(record: &ErrorRecord) {
    println!("{}", record.title);
    println!("{}", "=".repeat(record.title.chars().count()));
    println!("Id:       {}", record.id);
    println!("Status:   {}", record.status.label());
    println!("Type:     {}", record.category);
    println!("Created:  {}", record.created_at.format("%b %-d, %Y"));
    println!();
    println!("{}", record.description);
    for (heading, body) in [
        ("Problem Steps", &record.repro_steps),
        ("Solution", &record.fix_notes),
        ("Code", &record.code),
    ] {
        if !body.is_empty() {
            println!();
            println!("[{heading}]");
            println!("{body}");
        }
    }
    if let Some(data_url) = &record.image {
        let kind = ImageAttachment::from_data_url(data_url.as_str())
            .ok()
            .and_then(|image| image.content_type().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        println!();
        println!("[Screenshot] {kind} attached (use --image-out to save it)");
    }
}

fn handle_status(tracker: &Tracker, json: bool) -> anyhow::Result<()> {
    let stats = tracker.storage().stats()?;
    let accounts = tracker.account_count()?;
    let account = tracker.current_account();

    if json {
        let status = serde_json::json!({
            "signed_in": account.map(|a| &a.email),
            "records": tracker.records().len(),
            "accounts": accounts,
            "database_path": tracker.storage().path(),
            "entries": stats.entries,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("errtodo status");
        println!("--------------");
        match account {
            Some(a) => println!("Signed in:     {} <{}>", a.name, a.email),
            None => println!("Signed in:     no"),
        }
        println!("Error todos:   {}", tracker.records().len());
        println!("Accounts:      {accounts}");
        println!("Database:      {}", tracker.storage().path().display());
        println!("Documents:     {}", stats.entries);
        println!("Size:          {} bytes", stats.db_size_bytes);
    }
    Ok(())
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
                println!("  Database path:       {}", config.database_path().display());
                println!();
                println!("[Accounts]");
                println!(
                    "  Min password length: {}",
                    config.accounts.min_password_length
                );
                println!();
                println!("[Session]");
                println!(
                    "  Max idle (minutes):  {}",
                    config.session.max_idle_minutes
                );
                println!();
                println!("[Records]");
                println!("  Default category:    {}", config.records.default_category);
                println!("  Max image bytes:     {}", config.records.max_image_bytes);
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
