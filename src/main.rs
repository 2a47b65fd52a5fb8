mod commands;
mod error;
mod github;
mod notifier;
mod utils;

use std::process::exit;

use commands::Opts;
use log::error;

#[tokio::main]
async fn main() {
    let opts = Opts::parse_normalized();
    if let Err(e) = notifier::cli(opts).await {
        match e.downcast_ref::<error::Error>() {
            Some(err) => error!("{} error: {:#}", err.kind(), e),
            None => error!("{:#}", e),
        }
        exit(1);
    }
}
