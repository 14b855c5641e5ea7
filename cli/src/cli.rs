use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "sparql-kit")]
/// Command line client for SPARQL endpoints and Apache Jena Fuseki
pub struct Args {
    #[command(flatten)]
    pub http: HttpArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Args)]
pub struct HttpArgs {
    /// Username for HTTP Basic authentication
    #[arg(short, long, env = "SPARQL_KIT_USERNAME", global = true)]
    pub username: Option<String>,
    /// Password for HTTP Basic authentication
    ///
    /// Credentials are only sent if both the username and the password are set.
    #[arg(
        short,
        long,
        env = "SPARQL_KIT_PASSWORD",
        hide_env_values = true,
        global = true
    )]
    pub password: Option<String>,
    /// Timeout of each HTTP request in seconds, 0 to wait forever
    #[arg(short, long, default_value_t = 60, global = true)]
    pub timeout: u64,
    /// Accept invalid TLS certificates
    #[arg(short = 'k', long, global = true)]
    pub insecure: bool,
    /// Host header sent with every request
    #[arg(short = 'e', long, global = true, value_hint = ValueHint::Hostname)]
    pub host_header: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a SPARQL query or update
    Sparql {
        /// The endpoint URL, an RDF file or directory, or RDF text
        #[arg(value_hint = ValueHint::Url)]
        target: String,
        /// The query text
        ///
        /// If neither a query nor a query file is given, stdin is read.
        #[arg(conflicts_with = "query_file")]
        query: Option<String>,
        /// File to read the query from
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        query_file: Option<PathBuf>,
        /// How results are printed
        ///
        /// Graphs are always printed as received.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Only print the solutions of a SELECT or the boolean of an ASK
        #[arg(long)]
        bindings_only: bool,
        /// A prefix declared before the query, as `prefix=iri`
        #[arg(short, long = "namespace", value_parser = parse_namespace)]
        namespaces: Vec<(String, String)>,
    },
    /// Upload a file, or every RDF file of a directory, to a graph store
    Upload {
        /// File or directory to upload
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
        /// The graph store endpoint
        #[arg(value_hint = ValueHint::Url)]
        endpoint: String,
        /// Target graph: an IRI, `default`, or `file` for a graph per file
        #[arg(short, long, default_value = "default")]
        graph: String,
        /// Add to the graph content instead of replacing it
        #[arg(long)]
        append: bool,
        /// Media type the files are converted to
        ///
        /// By default each file is sent in its own syntax.
        #[arg(short, long)]
        media_type: Option<String>,
    },
    /// Remove all triples of a graph, or of all graphs with `all`
    Clear {
        /// Graph IRI, `default` or `all`
        graph: String,
        /// The dataset endpoint
        #[arg(value_hint = ValueHint::Url)]
        endpoint: String,
        /// Send a SPARQL CLEAR update instead of a graph store DELETE
        #[arg(long)]
        update: bool,
    },
    /// Graph Store Protocol operations
    Gsp {
        #[command(subcommand)]
        command: GspCommand,
    },
    /// Manage the datasets of a Fuseki server
    Dataset {
        #[command(subcommand)]
        command: DatasetCommand,
    },
    /// Fuseki server administration
    Server {
        #[command(subcommand)]
        command: ServerCommand,
    },
    /// Sort the triples of Turtle files into a canonical order
    Format {
        /// File or directory to format
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
        /// Fail instead of writing if a file would change
        #[arg(long)]
        check: bool,
        /// Syntax of the formatted files: turtle, ntriples or xml
        #[arg(long, default_value = "turtle")]
        output_format: String,
        /// File to write the formatted document to
        ///
        /// By default files are formatted in place.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output_file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum GspCommand {
    /// Print whether a graph exists
    Exists {
        #[arg(value_hint = ValueHint::Url)]
        endpoint: String,
        /// Graph IRI or `default`
        graph: String,
    },
    /// Download a graph
    Get {
        #[arg(value_hint = ValueHint::Url)]
        endpoint: String,
        /// Graph IRI or `default`
        graph: String,
        /// Media type requested from the server
        #[arg(short, long, default_value = "text/turtle")]
        media_type: String,
        /// File to write the graph to
        ///
        /// If no file is given, stdout is written.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output_file: Option<PathBuf>,
    },
    /// Replace the content of a graph with a file
    Put {
        #[arg(value_hint = ValueHint::Url)]
        endpoint: String,
        /// Graph IRI or `default`
        graph: String,
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Media type the file is sent in
        #[arg(short, long, default_value = "text/turtle")]
        media_type: String,
    },
    /// Add the content of a file to a graph
    Post {
        #[arg(value_hint = ValueHint::Url)]
        endpoint: String,
        /// Graph IRI or `default`
        graph: String,
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Media type the file is sent in
        #[arg(short, long, default_value = "text/turtle")]
        media_type: String,
    },
    /// Delete a graph
    Delete {
        #[arg(value_hint = ValueHint::Url)]
        endpoint: String,
        /// Graph IRI or `default`
        graph: String,
    },
}

#[derive(Subcommand)]
pub enum DatasetCommand {
    /// List the datasets of a server
    List {
        #[arg(value_hint = ValueHint::Url)]
        server: String,
    },
    /// Create a dataset
    Create {
        #[arg(value_hint = ValueHint::Url)]
        server: String,
        /// Name of the new dataset
        #[arg(required_unless_present = "config")]
        name: Option<String>,
        /// Storage of the new dataset
        #[arg(long, value_enum, default_value_t = DbType::Tdb2)]
        db_type: DbType,
        /// Assembler configuration in Turtle describing the dataset
        #[arg(short, long, conflicts_with = "name", value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
    },
    /// Delete a dataset
    Delete {
        #[arg(value_hint = ValueHint::Url)]
        server: String,
        name: String,
    },
}

#[derive(Subcommand)]
pub enum ServerCommand {
    /// Check that the server answers
    Ping {
        #[arg(value_hint = ValueHint::Url)]
        server: String,
    },
    /// Print the server description
    Status {
        #[arg(value_hint = ValueHint::Url)]
        server: String,
    },
    /// Print request statistics, of all datasets or of one
    Stats {
        #[arg(value_hint = ValueHint::Url)]
        server: String,
        dataset: Option<String>,
    },
    /// Print the running and finished tasks, or a single task
    Tasks {
        #[arg(value_hint = ValueHint::Url)]
        server: String,
        task: Option<String>,
    },
    /// Start a backup of a dataset
    Backup {
        #[arg(value_hint = ValueHint::Url)]
        server: String,
        dataset: String,
    },
    /// List the backup files
    Backups {
        #[arg(value_hint = ValueHint::Url)]
        server: String,
    },
    /// Print the server metrics
    Metrics {
        #[arg(value_hint = ValueHint::Url)]
        server: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// A text table
    Table,
    /// Native values as JSON
    Json,
    /// Comma separated values with a header row
    Csv,
    /// The response as sent by the endpoint
    Original,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DbType {
    Tdb2,
    Tdb,
    Mem,
}

fn parse_namespace(value: &str) -> Result<(String, String), String> {
    let (prefix, iri) = value
        .split_once('=')
        .ok_or_else(|| format!("expected prefix=iri, found {value}"))?;
    Ok((prefix.to_owned(), iri.to_owned()))
}
