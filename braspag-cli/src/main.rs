//! `braspag-query`: look up a Braspag transaction from the command line.
//!
//! ## Usage
//!
//! ```bash
//! # Credentials from BRASPAG_MERCHANT_ID / BRASPAG_MERCHANT_KEY
//! braspag-query 782a56e2-2dae-11e2-b3ee-080027d29772
//!
//! # Credentials from a TOML file, with a fixed correlation id
//! braspag-query --config braspag.toml --request-id 6a1c... 782a56e2-2dae-11e2-b3ee-080027d29772
//! ```
//!
//! The normalized result is printed as pretty JSON on stdout. Exit codes: `0` on success,
//! `2` when the gateway rejected the query, `1` on any other failure.

mod observability;

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use braspag_rest::{
    BraspagClient, BraspagError, ClientConfig, GatewayResponse, GetTransactionDataParams,
    observer::TracingObserver, transport::HttpTransport,
};
use clap::Parser;
use observability::{LogFormat, init_observability};
use tracing::error;

/// Query a Braspag sale by payment id
#[derive(Parser, Debug)]
#[command(name = "braspag-query")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Payment id (GUID) of the sale
    transaction_id: String,

    /// Correlation id sent as the RequestId header (generated when omitted)
    #[arg(long)]
    request_id: Option<String>,

    /// TOML configuration file (defaults to BRASPAG_* environment variables)
    #[arg(short, long, env = "BRASPAG_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_observability(LogFormat::from_env());

    match run(args).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "query failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> braspag_rest::Result<ExitCode> {
    let config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::from_env()?,
    };

    let transport = HttpTransport::new()?.with_observer(Arc::new(TracingObserver));
    let client = BraspagClient::with_transport(config, transport)?;

    let params = GetTransactionDataParams {
        request_id: args.request_id,
        ..GetTransactionDataParams::new(args.transaction_id)
    };
    let response = client.get_transaction_data(params).await?;

    let rendered = serde_json::to_string_pretty(&response)
        .map_err(|e| BraspagError::InvalidResponse(format!("cannot render result: {e}")))?;
    println!("{rendered}");

    Ok(match response {
        GatewayResponse::Success(_) => ExitCode::SUCCESS,
        GatewayResponse::Failure(_) => ExitCode::from(2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_minimal() {
        let args =
            Args::try_parse_from(["braspag-query", "782a56e2-2dae-11e2-b3ee-080027d29772"]).unwrap();
        assert_eq!(args.transaction_id, "782a56e2-2dae-11e2-b3ee-080027d29772");
        assert_eq!(args.request_id, None);
    }

    #[test]
    fn test_args_all_options() {
        let args = Args::try_parse_from([
            "braspag-query",
            "--request-id",
            "req-1",
            "--config",
            "braspag.toml",
            "782a56e2-2dae-11e2-b3ee-080027d29772",
        ])
        .unwrap();
        assert_eq!(args.request_id.as_deref(), Some("req-1"));
        assert_eq!(args.config, Some(PathBuf::from("braspag.toml")));
    }

    #[test]
    fn test_args_require_transaction_id() {
        assert!(Args::try_parse_from(["braspag-query"]).is_err());
    }

    #[test]
    fn test_args_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
