//! FIAP command line client
//!
//! # Usage
//!
//! ```bash
//! # Pull the latest values for two points
//! fiap --endpoint 192.0.2.10:18880 fetch http://host/power http://host/temp
//!
//! # Write one value (timestamped now unless --time is given)
//! fiap --endpoint 192.0.2.10:18880 write http://host/power 42
//!
//! # Subscribe for 60 seconds and print everything pushed back
//! fiap --endpoint 192.0.2.10:18880 trap http://host/power \
//!     --callback 192.0.2.20:18881 --ttl 60
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fiap_client::{FetchPolicy, FiapClient, TrapPolicy};
use fiap_core::{point_map, Body, Key, Point, PointMap, Query, Value};

/// FIAP (IEEE 1888) storage client
#[derive(Parser, Debug)]
#[command(name = "fiap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Storage endpoint address (host:port)
    #[arg(short, long, env = "FIAP_ENDPOINT")]
    endpoint: String,

    /// Log filter (e.g. info, fiap_client=debug)
    #[arg(long, env = "FIAP_LOG", default_value = "warn")]
    log: String,

    /// Abort a fetch after this many pages (default: unbounded)
    #[arg(long, env = "FIAP_MAX_PAGES")]
    max_pages: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch stored values for the given point ids
    Fetch {
        /// Point ids to fetch
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Write one value to a point
    Write {
        /// Point id
        id: String,

        /// Value to store
        value: String,

        /// Timestamp (RFC 3339, defaults to now)
        #[arg(long)]
        time: Option<String>,
    },

    /// Register a push subscription and print values until it expires
    Trap {
        /// Point ids to subscribe to
        #[arg(required = true)]
        ids: Vec<String>,

        /// Callback address the storage pushes to (host:port)
        #[arg(long, env = "FIAP_CALLBACK")]
        callback: String,

        /// Subscription lifetime in seconds
        #[arg(long, default_value = "60")]
        ttl: u64,

        /// Give up waiting after this many seconds (defaults to ttl + 5)
        #[arg(long)]
        timeout: Option<u64>,

        /// Tear the listener down if the wait times out
        #[arg(long)]
        cancel_on_timeout: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .with_target(false)
        .init();

    let mut client = FiapClient::connect(&args.endpoint)
        .with_context(|| format!("invalid endpoint {}", args.endpoint))?
        .with_fetch_policy(FetchPolicy {
            max_pages: args.max_pages,
        });

    match args.command {
        Command::Fetch { ids } => {
            let keys = ids.into_iter().map(Key::new).collect();
            let map = client.fetch_points(keys).await?;
            print_point_map(&map);
        }

        Command::Write { id, value, time } => {
            let time = match time {
                Some(t) => DateTime::parse_from_rfc3339(&t)
                    .with_context(|| format!("invalid timestamp {t}"))?,
                None => chrono::Local::now().fixed_offset(),
            };
            client
                .write(Body {
                    points: vec![Point::new(id.clone(), vec![Value::new(time, value)])],
                    point_sets: vec![],
                })
                .await?;
            info!(%id, "value written");
        }

        Command::Trap {
            ids,
            callback,
            ttl,
            timeout,
            cancel_on_timeout,
        } => {
            client = client.with_trap_policy(TrapPolicy { cancel_on_timeout });
            let timeout = Duration::from_secs(timeout.unwrap_or(ttl + 5));
            let keys: Vec<Key> = ids.into_iter().map(Key::trap).collect();

            info!(%callback, ttl, "registering trap");
            let points = client
                .trap(Query::stream(keys, callback, ttl), timeout)
                .await?;
            print_point_map(&point_map(&points));
        }
    }

    Ok(())
}

fn print_point_map(map: &PointMap) {
    for (id, values) in map {
        for (time, value) in values {
            println!("{id}\t{}\t{value}", time.to_rfc3339());
        }
    }
}
