//! Argument parsing for the `docview` binary.

use docview_core::{EndpointIds, Operation, PropertyType};
use std::str::FromStr;

pub const USAGE: &str = "\
usage: docview [--config <path>] <command> [args]

commands:
  resolve <module> <operation> [--view <id>] [--property <id>] [--record <id>]
  list <module> [--view <id>] [--search <text>] [--page <n> --limit <n>]
  get <module> <record-id>
  views <module>
  properties <module>
  add-property <module> <name> <type> [--view <id>] [--option <label>]...
  config <module>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Resolve {
        module: String,
        operation: Operation,
        ids: EndpointIds,
    },
    List {
        module: String,
        view_id: Option<String>,
        search: Option<String>,
        page: Option<(u32, u32)>,
    },
    Get {
        module: String,
        record_id: String,
    },
    Views {
        module: String,
    },
    Properties {
        module: String,
    },
    AddProperty {
        module: String,
        view_id: Option<String>,
        name: String,
        property_type: PropertyType,
        options: Vec<String>,
    },
    Config {
        module: String,
    },
}

impl Command {
    /// Whether the command talks to the server.
    pub fn needs_network(&self) -> bool {
        !matches!(self, Command::Resolve { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("missing command")]
    MissingCommand,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },
}

/// Parse arguments after the program name. `--config` is consumed here
/// and otherwise ignored; the config loader reads it separately.
pub fn parse_args<I>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut positional = Vec::new();
    let mut view = None;
    let mut property = None;
    let mut record = None;
    let mut search = None;
    let mut page = None;
    let mut limit = None;
    let mut options = Vec::new();

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                args.next().ok_or(UsageError::MissingArgument("--config"))?;
            }
            "--view" => view = Some(flag_value("--view", args.next())?),
            "--property" => property = Some(flag_value("--property", args.next())?),
            "--record" => record = Some(flag_value("--record", args.next())?),
            "--search" => search = Some(flag_value("--search", args.next())?),
            "--option" => options.push(flag_value("--option", args.next())?),
            "--page" => page = Some(parse_number("--page", args.next())?),
            "--limit" => limit = Some(parse_number("--limit", args.next())?),
            other if other.starts_with("--config=") => {}
            other if other.starts_with("--") => {
                return Err(UsageError::UnexpectedArgument(other.to_string()))
            }
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let command = positional.next().ok_or(UsageError::MissingCommand)?;
    let module = positional.next().ok_or(UsageError::MissingArgument("module"))?;

    let parsed = match command.as_str() {
        "resolve" => {
            let name = positional
                .next()
                .ok_or(UsageError::MissingArgument("operation"))?;
            let operation = Operation::from_str(&name).map_err(|_| UsageError::InvalidValue {
                flag: "operation",
                value: name.clone(),
            })?;
            Command::Resolve {
                module,
                operation,
                ids: EndpointIds {
                    view_id: view,
                    property_id: property,
                    record_id: record,
                },
            }
        }
        "list" => Command::List {
            module,
            view_id: view,
            search,
            page: match (page, limit) {
                (Some(page), Some(limit)) => Some((page, limit)),
                (None, None) => None,
                (Some(_), None) => return Err(UsageError::MissingArgument("--limit")),
                (None, Some(_)) => return Err(UsageError::MissingArgument("--page")),
            },
        },
        "get" => Command::Get {
            module,
            record_id: positional
                .next()
                .ok_or(UsageError::MissingArgument("record-id"))?,
        },
        "views" => Command::Views { module },
        "properties" => Command::Properties { module },
        "add-property" => {
            let name = positional.next().ok_or(UsageError::MissingArgument("name"))?;
            let tag = positional.next().ok_or(UsageError::MissingArgument("type"))?;
            let property_type = tag.parse::<PropertyType>().map_err(|_| UsageError::InvalidValue {
                flag: "type",
                value: tag.clone(),
            })?;
            Command::AddProperty {
                module,
                view_id: view,
                name,
                property_type,
                options,
            }
        }
        "config" => Command::Config { module },
        other => return Err(UsageError::UnknownCommand(other.to_string())),
    };

    if let Some(extra) = positional.next() {
        return Err(UsageError::UnexpectedArgument(extra));
    }
    Ok(parsed)
}

fn flag_value(flag: &'static str, value: Option<String>) -> Result<String, UsageError> {
    value.ok_or(UsageError::MissingArgument(flag))
}

fn parse_number(flag: &'static str, value: Option<String>) -> Result<u32, UsageError> {
    let value = flag_value(flag, value)?;
    value
        .parse()
        .map_err(|_| UsageError::InvalidValue { flag, value })
}
