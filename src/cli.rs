use clap::{Args, Parser, Subcommand};

/// clusto - command-line client for the clusto resource-management service
///
/// Every command resolves entities by name on the service and prints what it
/// finds. Connection settings come from flags, the environment, or clusto.toml.
#[derive(Parser, Debug)]
#[command(name = "clusto")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line client for the clusto service", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection and config arguments shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Config file path
    #[arg(short = 'c', long, env = "CLUSTO_CONFIG", global = true)]
    pub config: Option<String>,

    /// Service base URL
    #[arg(long, env = "CLUSTO_URL", global = true)]
    pub url: Option<String>,

    /// Basic-auth credential (user:password)
    #[arg(long, env = "CLUSTO_AUTH", global = true, hide_env_values = true)]
    pub auth: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "CLUSTO_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show an entity's full descriptor
    Show(EntityArgs),

    /// List an entity's attributes
    Attrs(AttrsArgs),

    /// List the entities containing an entity
    Parents(EntityArgs),

    /// List the entities an entity contains
    Contents(EntityArgs),

    /// List entities sharing all of an entity's role pools
    Siblings(SiblingsArgs),

    /// Show derived properties: type, role, datacenter, private IP
    Info(EntityArgs),

    /// Find entities by name
    Get(EntityArgs),

    /// Find entities by type, driver or name
    Entities(EntitiesArgs),

    /// List entities contained in all of the given pools
    Pools(PoolsArgs),

    /// Find the IP manager responsible for an address
    IpManager(IpManagerArgs),

    /// Invoke an arbitrary action on an entity
    Call(CallArgs),

    /// Delete an entity
    Delete(DeleteArgs),

    /// Pool management
    Pool(PoolArgs),

    /// Add an attribute to an entity
    AddAttr(AddAttrArgs),

    /// Configuration management utilities
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct EntityArgs {
    /// Entity name
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AttrsArgs {
    /// Entity name
    pub name: String,

    /// Attribute key
    #[arg(short, long)]
    pub key: Option<String>,

    /// Attribute subkey
    #[arg(short, long)]
    pub subkey: Option<String>,

    /// Attribute number
    #[arg(short, long)]
    pub number: Option<i64>,

    /// Attribute value
    #[arg(long)]
    pub value: Option<String>,

    /// Include attributes inherited from parent containers
    #[arg(long)]
    pub merged: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SiblingsArgs {
    /// Entity name
    pub name: String,

    /// Extra pool to intersect with (repeatable)
    #[arg(long)]
    pub include: Vec<String>,

    /// Role pool to ignore (repeatable)
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct EntitiesArgs {
    /// Entity type (repeatable, e.g. server, pool)
    #[arg(short = 't', long = "type")]
    pub types: Vec<String>,

    /// Entity name (repeatable)
    #[arg(short = 'n', long = "name")]
    pub names: Vec<String>,

    /// Driver name (repeatable)
    #[arg(short = 'd', long = "driver")]
    pub drivers: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PoolsArgs {
    /// Pool names
    #[arg(required = true)]
    pub pools: Vec<String>,

    /// Restrict to these entity types (repeatable)
    #[arg(short = 't', long = "type")]
    pub types: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct IpManagerArgs {
    /// IP address
    pub ip: String,
}

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Entity name
    pub name: String,

    /// Action name (e.g. show, attrs, get_port_attr)
    pub action: String,

    /// Arguments as key=value; true/false, integers and JSON are recognised
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Entity name
    pub name: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct PoolArgs {
    #[command(subcommand)]
    pub command: PoolCommand,
}

#[derive(Subcommand, Debug)]
pub enum PoolCommand {
    /// Create a new pool
    Create {
        /// Pool name
        name: String,
    },
    /// Insert an entity into a pool
    Insert {
        /// Pool name
        pool: String,

        /// Entity to insert, by name
        object: String,
    },
}

#[derive(Args, Debug)]
pub struct AddAttrArgs {
    /// Entity name
    pub name: String,

    pub key: String,

    pub subkey: String,

    pub value: String,

    /// Value type (int, relation); string when omitted
    #[arg(long)]
    pub datatype: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Validate {
        /// Path to config file
        path: String,
    },
    /// Generate example config file
    Generate,
    /// Show effective configuration (merged from all sources)
    Show,
}
