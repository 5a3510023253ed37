use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "anon", version, about = "Security label authority for PostgreSQL anonymization")]
struct Cli {
    /// Log filter, e.g. "debug" or "anon_policy=debug". Defaults to RUST_LOG, then "info".
    #[arg(long, global = true, env = "ANON_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a label against the security label grammar, without storing it.
    CheckLabel {
        /// Object kind: database, table, column, role or schema
        #[arg(long)]
        kind: String,

        #[arg(long, default_value_t = 1)]
        object_id: u32,

        /// Column number, for a column of a table
        #[arg(long)]
        column: Option<i32>,

        /// Check as a superuser
        #[arg(long, default_value_t = false)]
        superuser: bool,

        /// Also reject ';' in column labels
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Label text. Omit to check a label removal (IS NULL).
        #[arg(long)]
        label: Option<String>,
    },

    /// Print the schema of a function call, e.g. "anon.fake_city()".
    FunctionSchema { call: Option<String> },

    /// Print the masking policy that applies to a role.
    MaskingPolicy {
        /// Label file (YAML)
        #[arg(long)]
        labels: PathBuf,

        /// Settings file (YAML). Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        role: u32,
    },

    /// Validate a security label and store it in a label file.
    Label {
        /// Label file (YAML). Created when missing.
        #[arg(long)]
        labels: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Masking policy (label provider)
        #[arg(long)]
        policy: String,

        #[arg(long)]
        kind: String,

        #[arg(long)]
        object_id: u32,

        #[arg(long)]
        column: Option<i32>,

        /// Label text. Omit to remove the label.
        #[arg(long)]
        label: Option<String>,

        #[arg(long, default_value_t = false)]
        superuser: bool,
    },

    /// Label the anon schema TRUSTED under every configured policy.
    Init {
        #[arg(long)]
        labels: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        superuser: bool,
    },

    /// Run the query hooks over a SQL string on behalf of a role.
    Analyze {
        #[arg(long)]
        labels: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        role: u32,

        #[arg(long)]
        sql: String,
    },

    /// List the configured masking policies, in resolution order.
    Policies {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Inspect settings.
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Show one setting, or all of them.
    Show {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Setting name, e.g. "anon.masking_policies"
        key: Option<String>,

        #[arg(long, default_value_t = false)]
        superuser: bool,
    },
}

fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.cmd {
        Command::CheckLabel {
            kind,
            object_id,
            column,
            superuser,
            strict,
            label,
        } => {
            let object = commands::object_ref(&kind, object_id, column);
            commands::check_label::run(object, label.as_deref(), superuser, strict)?
        }

        Command::FunctionSchema { call } => commands::function_schema::run(call.as_deref())?,

        Command::MaskingPolicy {
            labels,
            config,
            role,
        } => commands::masking_policy::run(&labels, config.as_deref(), role)?,

        Command::Label {
            labels,
            config,
            policy,
            kind,
            object_id,
            column,
            label,
            superuser,
        } => {
            let object = commands::object_ref(&kind, object_id, column);
            commands::label::run(
                &labels,
                config.as_deref(),
                &policy,
                object,
                label.as_deref(),
                superuser,
            )?
        }

        Command::Init {
            labels,
            config,
            superuser,
        } => commands::init::run(&labels, config.as_deref(), superuser)?,

        Command::Analyze {
            labels,
            config,
            role,
            sql,
        } => commands::analyze::run(&labels, config.as_deref(), role, &sql)?,

        Command::Policies { config } => commands::config::policies(config.as_deref())?,

        Command::Config { cmd } => match cmd {
            ConfigCommand::Show {
                config,
                key,
                superuser,
            } => commands::config::show(config.as_deref(), key.as_deref(), superuser)?,
        },
    }

    Ok(())
}
