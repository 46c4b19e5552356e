//! Replay captured device requests through a handler
//!
//! Reads one request body per line from the file given as first argument,
//! or replays built-in captures when none is given.
//!
//! ```text
//! RUST_LOG=hpcount=debug cargo run --example replay -- requests.txt
//! ```

use std::sync::Arc;

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use hpcount::{CodecConfig, HandlerConfig, OccupancyCounter, RequestHandler};
use hpcount_types::Configuration;
use tracing_subscriber::EnvFilter;

const CAPTURED: &[&str] = &[
    "cmd=getsetting&flag=022E&data=0D3BB382030000000000000000000000000002085DDD5A75CBDC0A5DDD5A75CBDC909F33173CE4DA0F010100022E010000173B80C0",
    "cmd=cache&flag=1E28&status=010142AE51520156000D0001E6A7&data=15050D0D332A000100000000000000E97E&data=15050D0D332C000000000001000000C65E&count=2",
    // Resent upload, counted once
    "cmd=cache&flag=1E29&status=010142AE51520156000D0001E6A7&data=15050D0D332A000100000000000000E97E&count=1",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let requests: Vec<String> = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path))?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect(),
        None => CAPTURED.iter().map(|s| s.to_string()).collect(),
    };

    let system_time = NaiveDate::from_ymd_opt(2021, 5, 13)
        .and_then(|date| date.and_hms_opt(13, 52, 0))
        .context("demo clock")?;
    let open = NaiveTime::from_hms_opt(10, 0, 0).context("open clock")?;
    let close = NaiveTime::from_hms_opt(22, 0, 0).context("close clock")?;
    let desired = Configuration::new(system_time).with_business_hours(open, close);

    // Captured devices send status blocks whose trailer does not verify
    let config = HandlerConfig::default().with_codec(CodecConfig::default().with_status_checksum(false));

    let counter = Arc::new(OccupancyCounter::default());
    let sweeper = Arc::clone(&counter).spawn_sweeper();
    let handler = RequestHandler::new(desired, Arc::clone(&counter)).with_config(config);

    for request in &requests {
        match handler.handle(request) {
            Ok(reply) => println!("✓ {}", reply),
            Err(e) => println!("✗ {}", e),
        }
    }

    println!("Tally: {}", counter.tally());

    sweeper.abort();
    Ok(())
}
