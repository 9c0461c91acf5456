//! `%%` command lines: parsing and execution

use futures::{StreamExt, TryStreamExt};
use std::time::Instant;
use thiserror::Error;

use ollama_kernel_api::{parse_host_spec, ModelDescriptor, ServiceError};

use crate::config::{parse_bool, parse_port, parse_width, ConfigError};
use crate::session::{report_config_error, report_service_error, SessionState};
use crate::sink::OutputSink;

pub mod format;
pub mod progress;

pub use progress::PullProgress;

/// Prefix marking a command line
pub const COMMAND_PREFIX: &str = "%%";

const HELP: &str = "\
Commands (one per line, anywhere in a cell):
  %%host [HOST[:PORT]]      show or set the model server host
  %%port [PORT]             show or set the model server port
  %%model [NAME]            show or set the model used for prompts
  %%width [COLUMNS]         show or set the wrapping width
  %%markdown [on|off|toggle] show or set markdown rendering
  %%tags                    list installed models
  %%show [NAME]             describe a model (default: the active one)
  %%pull NAME               download a model
  %%delete NAME             remove an installed model
  %%config                  print the session configuration
  %%help                    this list
";

/// A cell split into command lines and prompt text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellParts<'a> {
    pub commands: Vec<&'a str>,
    pub prompt: String,
}

/// Partition cell text line by line, keeping the order of prompt lines
pub fn split_cell(text: &str) -> CellParts<'_> {
    let mut commands = Vec::new();
    let mut prompt_lines = Vec::new();

    for line in text.split('\n') {
        if line.starts_with(COMMAND_PREFIX) {
            commands.push(line);
        } else {
            prompt_lines.push(line);
        }
    }

    CellParts {
        commands,
        prompt: prompt_lines.join("\n"),
    }
}

/// One parsed command line; the argument is `None` when absent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Host(Option<String>),
    Port(Option<String>),
    Model(Option<String>),
    Width(Option<String>),
    Markdown(Option<String>),
    Tags,
    Show(Option<String>),
    Pull(Option<String>),
    Delete(Option<String>),
    Config,
    Help,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let body = line.strip_prefix(COMMAND_PREFIX).unwrap_or(line).trim();
        let (name, argument) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };
        let argument = (!argument.is_empty()).then(|| argument.to_string());

        match name {
            "host" | "hostname" => Command::Host(argument),
            "port" => Command::Port(argument),
            "model" => Command::Model(argument),
            "width" => Command::Width(argument),
            "markdown" => Command::Markdown(argument),
            "tags" | "models" => Command::Tags,
            "show" | "info" => Command::Show(argument),
            "pull" => Command::Pull(argument),
            "delete" | "remove" | "erase" => Command::Delete(argument),
            "config" => Command::Config,
            "help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Run every command line of `text` in order and return the remaining prompt
///
/// Command failures are reported to the sink and never stop later commands.
pub async fn dispatch(state: &mut SessionState, text: &str, sink: &mut dyn OutputSink) -> String {
    let cell = split_cell(text);

    for line in cell.commands {
        let command = Command::parse(line);
        match run(state, command, sink).await {
            Ok(()) => {}
            Err(CommandError::Config(err)) => report_config_error(sink, &err),
            Err(CommandError::Service(err)) => report_service_error(sink, &err),
        }
    }

    cell.prompt
}

async fn run(state: &mut SessionState, command: Command, sink: &mut dyn OutputSink) -> Result<(), CommandError> {
    match command {
        Command::Host(None) => sink.stdout(&format!("{}\n", state.config().host)),
        Command::Host(Some(spec)) => {
            let (host, port) = parse_host_spec(&spec);
            let port = port.as_deref().map(parse_port).transpose()?;
            let url = state.set_host(&host, port)?;
            sink.stdout(&format!("Setting base_url {:?}\n", url));
        }

        Command::Port(None) => sink.stdout(&format!("{}\n", state.config().port)),
        Command::Port(Some(port)) => {
            let url = state.set_port(parse_port(&port)?)?;
            sink.stdout(&format!("Setting base_url {:?}\n", url));
        }

        Command::Model(None) => sink.stdout(&format!("{}\n", state.config().model)),
        Command::Model(Some(model)) => {
            state.set_model(&model);
            sink.stdout(&format!("Setting model {:?}\n", model));
        }

        Command::Width(None) => sink.stdout(&format!("{}\n", state.config().width)),
        Command::Width(Some(width)) => {
            let width = parse_width(&width)?;
            state.set_width(width);
            sink.stdout(&format!("Setting width {}\n", width));
        }

        Command::Markdown(None) => sink.stdout(&format!("markdown {}\n", on_off(state.config().markdown))),
        Command::Markdown(Some(value)) => {
            let markdown = if value.eq_ignore_ascii_case("toggle") {
                !state.config().markdown
            } else {
                parse_bool(&value)?
            };
            state.set_markdown(markdown);
            sink.stdout(&format!("Setting markdown {}\n", on_off(markdown)));
        }

        Command::Tags => {
            let models: Vec<ModelDescriptor> = state.client().list_models().try_collect().await?;
            sink.stdout(&format::model_table(&models));
        }

        Command::Show(name) => {
            let name = name.unwrap_or_else(|| state.config().model.clone());
            let mut details = state.client().describe_model(&name);
            while let Some(record) = details.next().await {
                sink.stdout(&format::model_details(&name, &record?));
            }
        }

        Command::Pull(name) => {
            let name = name.ok_or(ConfigError::MissingArgument("pull"))?;
            pull(state, &name, sink).await?;
        }

        Command::Delete(name) => {
            let name = name.ok_or(ConfigError::MissingArgument("delete"))?;
            state.client().delete_model(&name).await?;
            sink.stdout(&format!("Deleted model {:?}\n", name));
        }

        Command::Config => sink.stdout(&format::config_summary(state.config(), state.base_url())),
        Command::Help => sink.stdout(HELP),
        Command::Unknown(name) => return Err(ConfigError::UnknownCommand(name).into()),
    }
    Ok(())
}

async fn pull(state: &mut SessionState, name: &str, sink: &mut dyn OutputSink) -> Result<(), ServiceError> {
    let mut progress = PullProgress::new();
    let mut records = state.client().pull_model(name);

    while let Some(record) = records.next().await {
        match record {
            Ok(record) => {
                if let Some(text) = progress.observe(&record, Instant::now()) {
                    sink.stdout(&text);
                }
            }
            Err(err) => {
                if let Some(newline) = progress.finish() {
                    sink.stdout(&newline);
                }
                return Err(err);
            }
        }
    }

    if let Some(newline) = progress.finish() {
        sink.stdout(&newline);
    }
    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
