use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use futures::future;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_raptor::domain::{format_duration, format_time};
use transit_raptor::network::{NetworkError, TransitNetwork};
use transit_raptor::rangeraptor::{
    CancellationToken, Heuristics, PathLeg, RangeRaptorService, RaptorError, RaptorResponse,
    SearchConfig, SearchContext, SearchDirection, SearchProfile, SearchRequest,
    TransitDataProvider,
};

/// Errors surfaced by the command line.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Search(#[from] RaptorError),

    #[error("search task failed: {0}")]
    Task(#[from] JoinError),
}

/// Range-Raptor journey search over a JSON transit network.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Transit network JSON file
    network: String,

    /// Search request JSON file
    request: String,

    /// Search configuration JSON file
    config: Option<String>,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let network = Arc::new(TransitNetwork::load(&args.network)?);
    let request: Arc<SearchRequest> = Arc::new(read_json(&args.request)?);
    let config: Arc<SearchConfig> = Arc::new(match &args.config {
        Some(path) => read_json(path)?,
        None => SearchConfig::default(),
    });
    info!(
        path = %args.network,
        stops = network.number_of_stops(),
        routes = network.number_of_routes(),
        "loaded network"
    );

    // Both heuristic passes are independent searches; run them side by
    // side on the blocking pool.
    let heuristics = if request.profile == SearchProfile::MultiCriteria && config.use_heuristics {
        let (forward, reverse) = future::join(
            spawn_heuristics(&network, &config, &request, SearchDirection::Forward),
            spawn_heuristics(&network, &config, &request, SearchDirection::Reverse),
        )
        .await;
        let (forward, reverse) = (forward??, reverse??);
        info!(
            forward_best = %format_duration(forward.best_overall_duration().max(0)),
            reverse_best = %format_duration(reverse.best_overall_duration().max(0)),
            "heuristics ready"
        );
        // A search is pruned by the pass running the other way.
        Some(Arc::new(if request.direction.is_forward() {
            reverse
        } else {
            forward
        }))
    } else {
        None
    };

    let cancel = CancellationToken::new();
    let context = SearchContext {
        cancel: cancel.clone(),
        heuristics,
        ..SearchContext::default()
    };
    let mut search: JoinHandle<Result<RaptorResponse, RaptorError>> = {
        let (network, config, request) = (network.clone(), config.clone(), request.clone());
        tokio::task::spawn_blocking(move || {
            RangeRaptorService::new(network.as_ref(), config.as_ref()).route_with(&request, context)
        })
    };
    let response = match config.timeout() {
        Some(timeout) => match tokio::time::timeout(timeout, &mut search).await {
            Ok(result) => result??,
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "search timed out, cancelling"
                );
                cancel.cancel();
                search.await??
            }
        },
        None => search.await??,
    };

    print_response(&network, &response, args.json)
}

fn spawn_heuristics(
    network: &Arc<TransitNetwork>,
    config: &Arc<SearchConfig>,
    request: &Arc<SearchRequest>,
    direction: SearchDirection,
) -> JoinHandle<Result<Heuristics, RaptorError>> {
    let (network, config, request) = (network.clone(), config.clone(), request.clone());
    tokio::task::spawn_blocking(move || {
        RangeRaptorService::new(network.as_ref(), config.as_ref())
            .compute_heuristics(&request, direction)
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::Json {
        path: path.to_string(),
        source,
    })
}

fn print_response(
    network: &TransitNetwork,
    response: &RaptorResponse,
    json: bool,
) -> Result<(), CliError> {
    if json {
        let out = serde_json::to_string_pretty(response).map_err(|source| CliError::Json {
            path: "response".to_string(),
            source,
        })?;
        println!("{out}");
        return Ok(());
    }

    if response.status.is_cancelled() {
        println!("Search cancelled; showing paths found so far.");
    }
    if response.paths.is_empty() {
        println!("No paths found.");
        return Ok(());
    }
    for (i, path) in response.paths.iter().enumerate() {
        println!(
            "{}. {} -> {} ({}, {} transfers, cost {})",
            i + 1,
            format_time(path.departure_time),
            format_time(path.arrival_time),
            format_duration(path.duration()),
            path.number_of_transfers,
            path.c1
        );
        for leg in &path.legs {
            println!("     {}", describe_leg(network, leg));
        }
    }
    Ok(())
}

fn describe_leg(network: &TransitNetwork, leg: &PathLeg) -> String {
    let dep = format_time(leg.departure_time());
    let arr = format_time(leg.arrival_time());
    match leg {
        PathLeg::Access { to_stop, .. } => {
            format!("{dep}  walk to {}  {arr}", network.stop_name(*to_stop))
        }
        PathLeg::Transit {
            from_stop,
            to_stop,
            route,
            trip,
            ..
        } => {
            let route = network.route(*route);
            format!(
                "{dep}  {} -> {} on {} ({})  {arr}",
                network.stop_name(*from_stop),
                network.stop_name(*to_stop),
                route.pattern().debug_info(),
                route.timetable().trip_schedule(*trip).label()
            )
        }
        PathLeg::Transfer {
            from_stop, to_stop, ..
        } => format!(
            "{dep}  walk {} -> {}  {arr}",
            network.stop_name(*from_stop),
            network.stop_name(*to_stop)
        ),
        PathLeg::Egress { from_stop, .. } => {
            format!("{dep}  walk from {}  {arr}", network.stop_name(*from_stop))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_positionals_and_json_flag() {
        let args =
            Args::try_parse_from(["transit-raptor", "net.json", "req.json", "--json"]).unwrap();
        assert_eq!(args.network, "net.json");
        assert_eq!(args.request, "req.json");
        assert_eq!(args.config, None);
        assert!(args.json);

        let args =
            Args::try_parse_from(["transit-raptor", "net.json", "req.json", "cfg.json"]).unwrap();
        assert_eq!(args.config.as_deref(), Some("cfg.json"));
        assert!(!args.json);
    }

    #[test]
    fn rejects_missing_and_extra_arguments() {
        assert!(Args::try_parse_from(["transit-raptor", "net.json"]).is_err());
        assert!(
            Args::try_parse_from(["transit-raptor", "a.json", "b.json", "c.json", "d.json"])
                .is_err()
        );
        assert!(Args::try_parse_from(["transit-raptor", "a.json", "b.json", "--verbose"]).is_err());
    }
}
