//! Binary entrypoint for the bbsnet CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml` and the network data directories
//! - `send --network <name> --to <n,..> ...` - frame a message and stage it
//! - `dump <file>` - decode the packets in a packet file and print them as JSON
//! - `status` - list published pending files per network
//!
//! See the library crate docs for module-level details: `bbsnet::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use bbsnet::config::Config;
use bbsnet::logutil::escape_log_bytes;
use bbsnet::metrics;
use bbsnet::net::pending::list_pending;
use bbsnet::net::{
    dispatch_message, main_type_name, net_info_minor_type_name, read_packets, MainType, NetMessage,
    NetworkDescriptor, PacketHeader, BROADCAST_NODE,
};

#[derive(Parser)]
#[command(name = "bbsnet")]
#[command(about = "Packet staging for BBS node-to-node networking")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Frame a message and stage it for local and remote recipients
    Send {
        /// Network name from the config file
        #[arg(short, long)]
        network: String,
        /// Recipient node numbers, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        to: Vec<u16>,
        /// Main message type code (2 = email, 3 = post, ...)
        #[arg(long = "type", default_value_t = 2)]
        message_type: u16,
        /// Minor type code
        #[arg(long, default_value_t = 0)]
        minor: u16,
        /// Sending user number
        #[arg(long, default_value_t = 1)]
        from_user: u16,
        /// Receiving user number
        #[arg(long, default_value_t = 0)]
        to_user: u16,
        /// Addressee name, for name-addressed email (type 7)
        #[arg(long)]
        to_name: Option<String>,
        /// Sender display name; defaults to "<sysop> #<from_user> @<node>"
        #[arg(long)]
        by: Option<String>,
        /// Message title
        #[arg(long, default_value = "")]
        title: String,
        /// Read the body from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Decode a packet file and print its packets as JSON
    Dump {
        file: PathBuf,
    },
    /// Show pending files per network and this process's counters
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config early to configure logging (except for Init which writes it)
    let pre_config = match cli.command {
        Commands::Init | Commands::Dump { .. } => None,
        _ => Some(Config::load(&cli.config).await?),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => {
            info!("Initializing new bbsnet configuration");
            Config::create_default(&cli.config).await?;
            let cfg = Config::default();
            info!("Configuration file created at {}", cli.config);
            for net in &cfg.networks {
                tokio::fs::create_dir_all(&net.dir).await?;
                info!("Created data directory {} for {}", net.dir.display(), net.name);
            }
        }
        Commands::Send {
            network,
            to,
            message_type,
            minor,
            from_user,
            to_user,
            to_name,
            by,
            title,
            file,
        } => {
            let config = pre_config.ok_or_else(|| anyhow!("configuration not loaded"))?;
            let net = config
                .network(&network)
                .cloned()
                .ok_or_else(|| anyhow!("Unknown network '{}'", network))?;
            tokio::fs::create_dir_all(net.data_directory()).await?;

            let body = match file {
                Some(path) => tokio::fs::read(&path)
                    .await
                    .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))?,
                None => {
                    let mut buf = Vec::new();
                    tokio::io::stdin().read_to_end(&mut buf).await?;
                    buf
                }
            };
            let byname = by.unwrap_or_else(|| format!("{} #{} @{}", config.bbs.sysop, from_user, net.node));

            let mut header = PacketHeader::now(message_type, net.node, BROADCAST_NODE);
            header.minor_type = minor;
            header.from_user = from_user;
            header.to_user = to_user;
            let mut message = NetMessage::new(&title, &byname, header.timestamp, &body);
            if let Some(name) = to_name {
                message = message.with_to_name(&name);
            }

            let report = tokio::task::spawn_blocking(move || {
                dispatch_message(net.data_directory(), &net, &header, &to, &message)
            })
            .await??;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_complete() {
                std::process::exit(1);
            }
        }
        Commands::Dump { file } => {
            let packets = tokio::task::spawn_blocking(move || read_packets(&file)).await??;
            let mut out = Vec::with_capacity(packets.len());
            for p in &packets {
                debug!("{}: {}", main_type_name(p.header.message_type), escape_log_bytes(&p.text));
                let parsed = NetMessage::parse(&p.text, p.header.message_type);
                let minor_name = (p.header.message_type == MainType::NetInfo.code())
                    .then(|| net_info_minor_type_name(p.header.minor_type));
                out.push(serde_json::json!({
                    "type_name": main_type_name(p.header.message_type),
                    "minor_type_name": minor_name,
                    "header": p.header,
                    "recipients": p.recipients,
                    "message": parsed.message,
                    "truncated_fields": parsed.truncated,
                }));
            }
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Status => {
            let config = pre_config.ok_or_else(|| anyhow!("configuration not loaded"))?;
            let mut networks = Vec::new();
            for net in &config.networks {
                let dir = net.data_directory().to_path_buf();
                let pending = tokio::task::spawn_blocking(move || list_pending(&dir)).await?;
                let (local, remote) = match &pending {
                    Ok(names) => names.iter().fold((0u32, 0u32), |(l, r), n| {
                        if n.is_local() {
                            (l + 1, r)
                        } else {
                            (l, r + 1)
                        }
                    }),
                    Err(_) => (0, 0),
                };
                networks.push(serde_json::json!({
                    "name": net.name,
                    "node": net.node,
                    "dir": net.dir,
                    "readable": pending.is_ok(),
                    "pending_local": local,
                    "pending_remote": remote,
                }));
            }
            let payload = serde_json::json!({
                "bbs": config.bbs.name,
                "networks": networks,
                "counters": metrics::snapshot(),
            });
            println!("{}", payload);
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity wins; otherwise the configured level, defaulting to info
    let configured = config
        .as_ref()
        .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| std::fs::OpenOptions::new().create(true).append(true).open(file).ok());
    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Foreground runs also echo to the console
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
