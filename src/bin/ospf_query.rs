//! Command-line client for the ospf-monitor query socket
//!
//! Sends one `(service, command)` request and prints the response.
//!
//! ```bash
//! ospf-query ospf neighbors
//! ospf-query -s /tmp/analyzer.sock analysis router
//! ospf-query ospf database area=0.0.0.0
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use ospf_monitor::ipc::{IpcClient, Message, ParamValue};

const DEFAULT_SOCKET_PATH: &str = "/var/run/ospf-monitor/analyzer.sock";

struct Args {
    socket_path: PathBuf,
    service: String,
    command: String,
    params: Vec<(String, ParamValue)>,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut args = std::env::args().skip(1);
        let mut socket_path = std::env::var("OSPF_MONITOR_IPC_SOCKET")
            .map_or_else(|_| PathBuf::from(DEFAULT_SOCKET_PATH), PathBuf::from);
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-s" | "--socket" => {
                    let path = args.next().context("--socket requires a path")?;
                    socket_path = PathBuf::from(path);
                }
                "-h" | "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "-v" | "--version" => {
                    println!("ospf-query v{}", ospf_monitor::VERSION);
                    std::process::exit(0);
                }
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let (Some(service), Some(command)) = (positional.next(), positional.next()) else {
            print_help();
            bail!("expected <service> <command>");
        };

        let params = positional
            .map(|pair| {
                let (key, value) = pair
                    .split_once('=')
                    .with_context(|| format!("parameter {pair:?} is not key=value"))?;
                Ok((key.to_string(), ParamValue::parse(value)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            socket_path,
            service,
            command,
            params,
        })
    }
}

fn print_help() {
    println!(
        r#"ospf-query v{}

Query a running ospf-monitor over its Unix socket.

USAGE:
    ospf-query [OPTIONS] <SERVICE> <COMMAND> [KEY=VALUE ...]

OPTIONS:
    -s, --socket <PATH>     Socket path [default: {}]
    -h, --help              Print help information
    -v, --version           Print version information

EXAMPLES:
    ospf-query frr routerData
    ospf-query ospf externalData
    ospf-query analysis lsdbToRib
    ospf-query system allResources
"#,
        ospf_monitor::VERSION,
        DEFAULT_SOCKET_PATH
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse()?;

    let mut message = Message::new(args.service, args.command);
    for (key, value) in args.params {
        message = message.with_param(key, value);
    }

    let client = IpcClient::new(&args.socket_path);
    let response = client
        .send(&message)
        .await
        .with_context(|| format!("query to {:?} failed", args.socket_path))?;

    println!("{}: {}", response.status, response.message);
    if let Some(kind) = response.kind() {
        println!("{kind:#?}");
    }

    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
