use crate::cli::{
    Args, Command, DatasetCommand, DbType, GspCommand, HttpArgs, OutputFormat, ServerCommand,
};
use anyhow::{bail, Context};
use clap::Parser;
use prettytable::{Cell, Row};
use sparql_kit::format::{format_file, format_path, OutputFormat as FormatOutput};
use sparql_kit::fuseki::dataset::{DatasetDescription, DatasetType};
use sparql_kit::fuseki::{admin, dataset};
use sparql_kit::gsp::{self, RdfSource};
use sparql_kit::io::serialize_graph;
use sparql_kit::results::{NativeValue, QueryOptions, QueryOutput, ResultFormat, Table};
use sparql_kit::upload::{upload_path, UploadGraph, UploadOptions};
use sparql_kit::{
    Credentials, HttpClient, HttpOptions, RdfMediaType, SparqlExecutor, Target,
};
use std::fs::{self, File};
use std::io::{self, stdin, stdout, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod cli;

pub fn main() -> anyhow::Result<()> {
    let matches = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let client = HttpClient::with_options(&http_options(&matches.http))?;
    let mut out = stdout().lock();
    match matches.command {
        Command::Sparql {
            target,
            query,
            query_file,
            format,
            bindings_only,
            namespaces,
        } => {
            let query = read_query(query, query_file)?;
            let target = target.parse::<Target>()?;
            let mut options = QueryOptions::default().with_bindings_only(bindings_only);
            for (prefix, iri) in namespaces {
                options = options.with_namespace(prefix, iri);
            }
            let executor = SparqlExecutor::new();
            let kind = executor.classify(&options.prepare_query(&query)).kind;
            options.format = match format {
                OutputFormat::Original => ResultFormat::Original,
                _ if !kind.is_tabular() => ResultFormat::Original,
                OutputFormat::Json => ResultFormat::Native,
                OutputFormat::Table | OutputFormat::Csv => ResultFormat::Tabular,
            };
            let output = executor.query(&target, &query, Some(&client), &options)?;
            write_query_output(&mut out, output, format)?;
        }
        Command::Upload {
            path,
            endpoint,
            graph,
            append,
            media_type,
        } => {
            let options = UploadOptions {
                graph: UploadGraph::parse(&graph)?,
                append,
                media_type: media_type
                    .map(|media_type| RdfMediaType::parse_allowed(&media_type))
                    .transpose()?,
            };
            let count = upload_path(&endpoint, &path, &options, Some(&client))?;
            writeln!(out, "Uploaded {count} file(s) to {endpoint}")?;
        }
        Command::Clear {
            graph,
            endpoint,
            update,
        } => {
            if update {
                gsp::clear_with_update(&endpoint, &graph, Some(&client))?;
            } else {
                gsp::clear(&endpoint, &graph, Some(&client))?
                    .into_result()
                    .with_context(|| format!("Failed to clear {graph}"))?;
            }
            writeln!(out, "Cleared {graph}")?;
        }
        Command::Gsp { command } => run_gsp(&mut out, command, &client)?,
        Command::Dataset { command } => run_dataset(&mut out, command, &client)?,
        Command::Server { command } => {
            let text = match command {
                ServerCommand::Ping { server } => admin::ping(&server, Some(&client))?,
                ServerCommand::Status { server } => admin::status(&server, Some(&client))?,
                ServerCommand::Stats { server, dataset } => {
                    admin::stats(&server, dataset.as_deref(), Some(&client))?
                }
                ServerCommand::Tasks { server, task } => {
                    admin::tasks(&server, task.as_deref(), Some(&client))?
                }
                ServerCommand::Backup { server, dataset } => {
                    admin::backup(&server, &dataset, Some(&client))?
                }
                ServerCommand::Backups { server } => admin::backups_list(&server, Some(&client))?,
                ServerCommand::Metrics { server } => admin::metrics(&server, Some(&client))?,
            };
            writeln!(out, "{}", text.trim_end())?;
        }
        Command::Format {
            path,
            check,
            output_format,
            output_file,
        } => {
            let output = output_format.parse::<FormatOutput>()?;
            if let Some(output_file) = output_file {
                if path.is_dir() {
                    bail!("--output-file cannot be used with a directory");
                }
                format_file(&path, check, output, Some(&output_file))?;
            } else {
                let report = format_path(&path, check, output)?;
                writeln!(
                    out,
                    "{} of {} file(s) formatted",
                    report.changed, report.total
                )?;
            }
        }
    }
    Ok(out.flush()?)
}

fn run_gsp(out: &mut impl Write, command: GspCommand, client: &HttpClient) -> anyhow::Result<()> {
    match command {
        GspCommand::Exists { endpoint, graph } => {
            writeln!(out, "{}", gsp::exists(&endpoint, &graph, Some(client))?)?;
        }
        GspCommand::Get {
            endpoint,
            graph,
            media_type,
            output_file,
        } => {
            let content = gsp::get(&endpoint, &graph, &media_type, Some(client))?
                .into_result()
                .with_context(|| format!("Failed to get {graph}"))?;
            let body = serialize_graph(&content, RdfMediaType::parse_allowed(&media_type)?)?;
            if let Some(output_file) = output_file {
                let mut writer = BufWriter::new(File::create(output_file)?);
                writer.write_all(&body)?;
                close_file_writer(writer)?;
            } else {
                out.write_all(&body)?;
            }
        }
        GspCommand::Put {
            endpoint,
            graph,
            file,
            media_type,
        } => {
            gsp::put(&endpoint, &graph, &RdfSource::File(file), &media_type, Some(client))?
                .into_result()
                .with_context(|| format!("Failed to replace {graph}"))?;
            writeln!(out, "Replaced {graph}")?;
        }
        GspCommand::Post {
            endpoint,
            graph,
            file,
            media_type,
        } => {
            gsp::post(&endpoint, &graph, &RdfSource::File(file), &media_type, Some(client))?
                .into_result()
                .with_context(|| format!("Failed to add to {graph}"))?;
            writeln!(out, "Added to {graph}")?;
        }
        GspCommand::Delete { endpoint, graph } => {
            gsp::delete(&endpoint, &graph, Some(client))?
                .into_result()
                .with_context(|| format!("Failed to delete {graph}"))?;
            writeln!(out, "Deleted {graph}")?;
        }
    }
    Ok(())
}

fn run_dataset(
    out: &mut impl Write,
    command: DatasetCommand,
    client: &HttpClient,
) -> anyhow::Result<()> {
    let message = match command {
        DatasetCommand::List { server } => {
            return write_datasets(out, &dataset::list(&server, Some(client))?);
        }
        DatasetCommand::Create {
            server,
            name,
            db_type,
            config,
        } => match (name, config) {
            (_, Some(config)) => {
                let config = fs::read_to_string(&config).with_context(|| {
                    format!("Failed to read the configuration {}", config.display())
                })?;
                dataset::create_from_config(&server, &config, Some(client))?
            }
            (Some(name), None) => {
                dataset::create(&server, &name, dataset_type(db_type), Some(client))?
            }
            (None, None) => bail!("A dataset name or a configuration is required"),
        },
        DatasetCommand::Delete { server, name } => dataset::delete(&server, &name, Some(client))?,
    };
    writeln!(out, "{message}")?;
    Ok(())
}

fn dataset_type(db_type: DbType) -> DatasetType {
    match db_type {
        DbType::Tdb2 => DatasetType::Tdb2,
        DbType::Tdb => DatasetType::Tdb,
        DbType::Mem => DatasetType::Mem,
    }
}

fn http_options(args: &HttpArgs) -> HttpOptions {
    let credentials = Credentials::from_parts(args.username.clone(), args.password.clone());
    if credentials.is_none() && (args.username.is_some() || args.password.is_some()) {
        warn!("Both a username and a password are needed, requests are sent without credentials");
    }
    HttpOptions {
        credentials,
        timeout: (args.timeout > 0).then(|| Duration::from_secs(args.timeout)),
        accept_invalid_certs: args.insecure,
        host_header: args.host_header.clone(),
    }
}

fn read_query(query: Option<String>, query_file: Option<PathBuf>) -> anyhow::Result<String> {
    if let Some(query) = query {
        return Ok(query);
    }
    if let Some(file) = query_file {
        return fs::read_to_string(&file)
            .with_context(|| format!("Failed to read the query file {}", file.display()));
    }
    let mut query = String::new();
    stdin()
        .lock()
        .read_to_string(&mut query)
        .context("Failed to read the query from stdin")?;
    Ok(query)
}

fn write_query_output(
    out: &mut impl Write,
    output: QueryOutput,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match output {
        QueryOutput::Empty => info!("The endpoint answered without content"),
        QueryOutput::Text(text) => writeln!(out, "{}", text.trim_end())?,
        QueryOutput::Boolean(value) => writeln!(out, "{value}")?,
        QueryOutput::Solutions(solutions) => {
            serde_json::to_writer_pretty(&mut *out, &solutions)?;
            writeln!(out)?;
        }
        QueryOutput::Bindings(bindings) => {
            serde_json::to_writer_pretty(&mut *out, &bindings)?;
            writeln!(out)?;
        }
        QueryOutput::Graph(graph) => write!(out, "{graph}")?,
        QueryOutput::Table(table) => match format {
            OutputFormat::Csv => write_csv(out, &table)?,
            _ => write_table(out, &table)?,
        },
    }
    Ok(())
}

fn cell(value: Option<&NativeValue>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

fn write_table(out: &mut impl Write, table: &Table) -> io::Result<()> {
    let mut pretty = prettytable::Table::new();
    pretty.set_titles(Row::new(
        table.columns.iter().map(|column| Cell::new(column)).collect(),
    ));
    for row in &table.rows {
        pretty.add_row(Row::new(
            row.iter()
                .map(|value| Cell::new(&cell(value.as_ref())))
                .collect(),
        ));
    }
    pretty.print(out)?;
    Ok(())
}

fn write_csv(out: &mut impl Write, table: &Table) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|value| cell(value.as_ref())))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_datasets(out: &mut impl Write, datasets: &[DatasetDescription]) -> anyhow::Result<()> {
    let mut pretty = prettytable::Table::new();
    pretty.set_titles(Row::new(vec![
        Cell::new("name"),
        Cell::new("active"),
        Cell::new("services"),
    ]));
    for dataset in datasets {
        let services = dataset
            .services
            .iter()
            .map(|service| service.service_type.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        pretty.add_row(Row::new(vec![
            Cell::new(&dataset.name),
            Cell::new(&dataset.state.to_string()),
            Cell::new(&services),
        ]));
    }
    pretty.print(out)?;
    Ok(())
}

fn close_file_writer(writer: BufWriter<File>) -> io::Result<()> {
    let mut file = writer
        .into_inner()
        .map_err(io::IntoInnerError::into_error)?;
    file.flush()?;
    file.sync_all()
}
