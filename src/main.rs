use anyhow::{bail, Context};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use sora_admin::commands::{dispatch, Command, Outcome};
use sora_admin::core::logger::init_logger;
use sora_admin::core::models::BatchAction;
use sora_admin::core::traits::{DefaultStorageConfig, NoticeLog, StorageConfig};
use sora_admin::AdminState;

mod cli;

use cli::{Args, Cmd, ConfigCmd, KeysCmd};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let storage = match &args.data_dir {
        Some(dir) => DefaultStorageConfig::with_path(dir.clone()),
        None => DefaultStorageConfig::new(),
    }
    .context("Failed to prepare data directory")?;
    let _log_guard = init_logger(&storage.log_dir(), &args.log_level)
        .context("Failed to initialize logging")?;

    let notices = Arc::new(NoticeLog::new());
    let state = AdminState::with_data_dir(storage, args.base_url.clone(), notices.clone())
        .context("Failed to initialize admin state")?;
    tracing::debug!("Data directory: {}", state.data_dir().display());

    let session_state = state.init().await;
    tracing::debug!("Session on startup: {:?}", session_state);
    flush_notices(&notices);

    let outcome = run(&state, &notices, args.command, args.json).await?;
    flush_notices(&notices);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        cli::render::outcome(&outcome);
    }

    Ok(match outcome {
        Outcome::Abandoned | Outcome::SessionExpired | Outcome::LoginFailed { .. } => {
            ExitCode::FAILURE
        }
        _ => ExitCode::SUCCESS,
    })
}

fn flush_notices(notices: &NoticeLog) {
    for notice in notices.drain() {
        cli::render::notice(&notice);
    }
}

/// Translate a parsed command line into dispatched commands, prompting
/// where an action needs confirmation
async fn run(
    state: &AdminState,
    notices: &NoticeLog,
    command: Cmd,
    json: bool,
) -> anyhow::Result<Outcome> {
    let command = match command {
        Cmd::Login { admin_key } => {
            let admin_key = match admin_key {
                Some(key) => key,
                None => cli::prompt("Admin key: ")?,
            };
            Command::Login { admin_key }
        }
        Cmd::Logout => Command::Logout,
        Cmd::Status => Command::Status,
        Cmd::Dashboard => Command::Dashboard,
        Cmd::Stats => Command::ShowStats,
        Cmd::Config(ConfigCmd::Show) => Command::ShowConfig,
        Cmd::Config(ConfigCmd::Set(set)) => Command::SaveConfig(set.into()),
        Cmd::Keys(keys) => match keys {
            KeysCmd::List { search, page } => Command::ListKeys { search, page },
            KeysCmd::Show { id } => Command::ShowKey { id },
            KeysCmd::Add(add) => Command::AddKey(add.into()),
            KeysCmd::Update(update) => {
                let (id, patch) = update.into_parts();
                Command::UpdateKey { id, patch }
            }
            KeysCmd::Delete { id, yes } => {
                if !yes && !cli::confirm("Are you sure you want to delete this key?")? {
                    return Ok(Outcome::Abandoned);
                }
                Command::DeleteKey { id }
            }
            KeysCmd::Test { key, name } => Command::TestKey {
                name,
                key_value: key,
            },
            KeysCmd::Enable { ids } => Command::BatchKeys {
                action: BatchAction::Enable,
                ids,
            },
            KeysCmd::Disable { ids } => Command::BatchKeys {
                action: BatchAction::Disable,
                ids,
            },
            KeysCmd::RemoveMany { ids, yes } => {
                let action = BatchAction::Delete;
                if !yes && !cli::confirm(&action.confirm_message(ids.len()))? {
                    return Ok(Outcome::Abandoned);
                }
                Command::BatchKeys { action, ids }
            }
            KeysCmd::Import {
                file,
                disabled,
                preview,
                yes,
            } => {
                if file.is_none() && !preview && !yes {
                    bail!("--yes is required when reading keys from stdin");
                }
                let text = cli::read_import_text(file.as_deref())
                    .context("Failed to read import data")?;
                let enabled = !disabled;

                let previewed = dispatch(
                    state,
                    Command::PreviewImport {
                        text: text.clone(),
                        enabled,
                    },
                )
                .await;
                if preview {
                    return Ok(previewed);
                }
                let parsed = match previewed {
                    Outcome::ImportPreview(parsed) => parsed,
                    other => return Ok(other),
                };
                if parsed.is_empty() {
                    return Ok(Outcome::Abandoned);
                }
                if !yes {
                    flush_notices(notices);
                    if !json {
                        cli::render::import_preview(&parsed);
                    }
                    let question = format!("Import {} keys?", parsed.candidates.len());
                    if !cli::confirm(&question)? {
                        return Ok(Outcome::Abandoned);
                    }
                }
                Command::Import { text, enabled }
            }
        },
    };

    Ok(dispatch(state, command).await)
}
