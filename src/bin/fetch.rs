use std::path::PathBuf;
use std::process;

use clap::Parser;

use velov_trips::cyclocity::{self, Credentials};
use velov_trips::pipeline::dataset;

/// Download a rider's trip history from the Cyclocity API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, env = "VELOV_CONTRACT", default_value = "lyon")]
    contract: String,

    #[arg(long, env = "VELOV_ACCOUNT")]
    account: String,

    /// AUTH_SESSION_ID cookie from a logged-in browser session
    #[arg(long, env = "VELOV_AUTH_SESSION_ID", hide_env_values = true)]
    auth_session_id: String,

    /// INGRESSCOOKIE cookie from the same session
    #[arg(long, env = "VELOV_INGRESS_COOKIE", hide_env_values = true)]
    ingress_cookie: String,

    #[arg(long, default_value = "velov_trips_export.json")]
    output: PathBuf,

    #[arg(long, default_value = cyclocity::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let url = cyclocity::trips_url(&args.base_url, &args.contract, &args.account);
    let credentials = Credentials {
        auth_session_id: args.auth_session_id,
        ingress_cookie: args.ingress_cookie,
    };

    log::info!("Fetching trips from {}", url);
    let export = match cyclocity::create_client(args.timeout_secs)
        .and_then(|client| cyclocity::fetch_trips(&client, &url, &credentials))
    {
        Ok(export) => export,
        Err(e) => {
            log::error!("{}", e);
            match &e {
                cyclocity::Error::Status { body, .. } | cyclocity::Error::InvalidBody { body, .. } => {
                    log::error!("Check the session cookies and the account id. Response body:\n{}", body);
                }
                cyclocity::Error::Http(_) => {}
            }
            process::exit(1);
        }
    };

    let listed = cyclocity::log_trip_endpoints(&export);
    if let Err(e) = dataset::write_pretty(&args.output, &export) {
        log::error!("{}", e);
        process::exit(1);
    }
    println!("Exported {} trips to {}", listed, args.output.display());
}
