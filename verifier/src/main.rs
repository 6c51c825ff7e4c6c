// SPDX-License-Identifier: MIT

mod client;
mod report;
mod verify;

use std::process::ExitCode;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

// Shared project modules
use shared::error::{Chain, VerifyError};
use shared::utils::parse_cli_args_verifier;
use shared::{log_debug, log_info};

use crate::client::EthEndpoint;
use crate::report::{print_banner, print_report, verdict_exit_code};
use crate::verify::{validate_address, verify, VerifyOptions};

const DEFAULT_SRC_RPC: &str = "https://mainnet.infura.io/v3/YOUR_INFURA_KEY";
const DEFAULT_DST_RPC: &str = "https://arb1.arbitrum.io/rpc";

fn fail(err: VerifyError) -> ExitCode {
    println!("❌ {err}");
    ExitCode::from(err.exit_code())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let matches = parse_cli_args_verifier();

    let filter = if matches.get_flag("verbose") {
        // debug for everything
        "debug"
    } else {
        // info+ for everything
        "info"
    };
    let env_filter = EnvFilter::new(filter);

    // Initialize the tracing subscriber with the environment filter
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Flag, then environment, then the built-in public endpoint.
    let src_rpc = matches
        .get_one::<String>("src-rpc")
        .cloned()
        .or_else(|| std::env::var("SRC_RPC_URL").ok())
        .unwrap_or_else(|| DEFAULT_SRC_RPC.to_string());
    let dst_rpc = matches
        .get_one::<String>("dst-rpc")
        .cloned()
        .or_else(|| std::env::var("DST_RPC_URL").ok())
        .unwrap_or_else(|| DEFAULT_DST_RPC.to_string());

    let opts = VerifyOptions {
        address: matches.get_one::<String>("address").unwrap().clone(),
        src_rpc,
        dst_rpc,
        src_block: matches.get_one::<String>("src-block").unwrap().clone(),
        dst_block: matches.get_one::<String>("dst-block").unwrap().clone(),
    };
    let timeout = Duration::from_secs(*matches.get_one::<u64>("timeout").unwrap());

    // Address syntax gates everything else; no endpoint is touched when it
    // fails.
    if let Err(err) = validate_address(&opts.address) {
        return fail(err);
    }

    log_debug!("starting verification with timeout {}s", timeout.as_secs());
    print_banner(&opts);

    let src = match EthEndpoint::connect(&opts.src_rpc, timeout) {
        Ok(endpoint) => endpoint,
        Err(err) => {
            log_info!("source endpoint rejected: {err}");
            return fail(VerifyError::Connectivity { chain: Chain::Source });
        }
    };
    let dst = match EthEndpoint::connect(&opts.dst_rpc, timeout) {
        Ok(endpoint) => endpoint,
        Err(err) => {
            log_info!("destination endpoint rejected: {err}");
            return fail(VerifyError::Connectivity {
                chain: Chain::Destination,
            });
        }
    };

    match verify(&src, &dst, &opts).await {
        Ok(result) => {
            print_report(&result, matches.get_flag("json"));
            ExitCode::from(verdict_exit_code(&result))
        }
        Err(err) => fail(err),
    }
}
