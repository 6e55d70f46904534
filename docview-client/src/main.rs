//! docview command-line entry point.

use docview_client::cli::{self, Command, USAGE};
use docview_client::config::{self, ClientConfig};
use docview_client::{init_tracing, ApiClientError, DocumentViewService, HttpTransport};
use docview_core::{NewProperty, RecordQuery, RouteTable, SelectOption};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let command = match cli::parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{}\n\n{}", err, USAGE);
            return ExitCode::from(2);
        }
    };

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Color given to options created from the command line.
const OPTION_COLOR: &str = "default";

async fn run(command: Command) -> Result<(), ApiClientError> {
    if !command.needs_network() {
        return run_offline(&command);
    }

    let config = ClientConfig::load()?;
    init_tracing(&config.log)?;
    let transport = Arc::new(HttpTransport::new(&config)?);
    let routes = config.route_table();
    let service = |module: &str| {
        DocumentViewService::new(Arc::clone(&transport), module).with_routes(routes.clone())
    };

    match command {
        Command::Resolve { .. } => Ok(()),
        Command::List {
            module,
            view_id,
            search,
            page,
        } => {
            let mut query = RecordQuery::new();
            if let Some(view_id) = view_id {
                query = query.view(view_id);
            }
            if let Some(search) = search {
                query = query.search(search);
            }
            if let Some((page, limit)) = page {
                query = query.page(page, limit);
            }
            print_json(&service(&module).list_records(&query).await?)
        }
        Command::Get { module, record_id } => {
            print_json(&service(&module).get_record(&record_id).await?)
        }
        Command::Views { module } => print_json(&service(&module).list_views().await?),
        Command::Properties { module } => print_json(&service(&module).list_properties().await?),
        Command::AddProperty {
            module,
            view_id,
            name,
            property_type,
            options,
        } => {
            let options = options
                .into_iter()
                .map(|label| SelectOption::new(label, OPTION_COLOR))
                .collect();
            let property = NewProperty::new(name, property_type).with_options(options);
            let created = service(&module)
                .add_property(view_id.as_deref(), &property)
                .await?;
            print_json(&created)
        }
        Command::Config { module } => print_json(&service(&module).get_config().await?),
    }
}

/// Commands answered from the route table alone. A config file only
/// contributes its module overrides.
fn run_offline(command: &Command) -> Result<(), ApiClientError> {
    let Command::Resolve {
        module,
        operation,
        ids,
    } = command
    else {
        return Ok(());
    };
    let routes = match config::config_path() {
        Some(path) => {
            let config = ClientConfig::from_path(&path)?;
            config.validate()?;
            config.route_table()
        }
        None => RouteTable::builtin(),
    };
    let endpoint = routes.resolve(module, *operation, ids, None)?;
    print_json(&endpoint)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ApiClientError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
