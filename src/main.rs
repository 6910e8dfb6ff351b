use clap::Parser;
use wildguard::location::{LocationResolver, LocationSource, ResolvedLocation};
use wildguard::risk::{RiskOrchestrator, StageEvent, OVERALL_DEADLINE};
use wildguard::GeoCoordinate;

/// Wildguard — wildfire risk lookup that never comes back empty.
///
/// Resolves the device location through a tiered fallback chain, then the
/// current fire risk through ranked sources with a geospatial cache behind
/// them. Always produces an answer; at worst a seasonal estimate.
///
/// Examples:
///   wildguard
///   wildguard --lat 55.9533 --lon -3.1883
///   wildguard --offline
///   wildguard --save-manual --lat 55.9533 --lon -3.1883 --place Edinburgh
///   wildguard --serve --port 8080
#[derive(Parser)]
#[command(name = "wildguard", version, about, long_about = None)]
struct Cli {
    /// Latitude (-90 to 90). Overrides the location tiers.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude (-180 to 180). Overrides the location tiers.
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Fail instead of falling back to the persisted default location.
    #[arg(long)]
    no_default: bool,

    /// Offline mode: skip network sources, use cache and estimate only.
    #[arg(long)]
    offline: bool,

    /// Persist --lat/--lon as the manual location and exit.
    #[arg(long)]
    save_manual: bool,

    /// Place name stored alongside a manual location.
    #[arg(long, default_value = "")]
    place: String,

    /// Print the source attempt trail to stderr.
    #[arg(long)]
    trace: bool,

    /// Run the HTTP server instead of a one-shot lookup.
    #[arg(long)]
    serve: bool,

    /// Server bind host.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server bind port.
    #[arg(long, default_value_t = 8723)]
    port: u16,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.serve {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap_or_else(|e| {
                eprintln!("Error: Cannot start runtime: {}", e);
                std::process::exit(1);
            });
        runtime.block_on(wildguard::server::start(&cli.host, cli.port));
        return;
    }

    if cli.save_manual {
        let (lat, lon) = match (cli.lat, cli.lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                eprintln!("Error: --save-manual requires --lat and --lon");
                std::process::exit(1);
            }
        };
        let mut resolver = LocationResolver::new();
        resolver
            .save_manual(GeoCoordinate::new(lat, lon), &cli.place)
            .unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });
        eprintln!("  Saved manual location ({})", GeoCoordinate::new(lat, lon).redacted());
        return;
    }

    // ── Resolve location ────────────────────────────────────────

    let location = resolve_location(&cli);

    eprintln!(
        "  \u{1F4CD} {} [{}]",
        location.coordinates.redacted(),
        location.source
    );

    // ── Resolve risk ────────────────────────────────────────────

    let mut orchestrator = RiskOrchestrator::new();
    if cli.offline {
        orchestrator.set_offline(true);
    }

    let (result, events) = orchestrator.resolve_traced(location.coordinates, OVERALL_DEADLINE);

    if cli.trace {
        for event in &events {
            match event {
                StageEvent::Started(stage) => eprintln!("  \u{2192} trying {:?}", stage),
                StageEvent::Succeeded(stage) => eprintln!("  \u{2713} {:?} answered", stage),
                StageEvent::Failed(stage, reason) => {
                    eprintln!("  \u{2717} {:?} failed: {}", stage, reason)
                }
            }
        }
    }

    let observation = result.unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    eprintln!(
        "  \u{1F525} {} [{} / {}]",
        observation.level, observation.source, observation.freshness
    );

    // JSON to stdout
    println!("{}", serde_json::to_string_pretty(&observation).unwrap());
}

fn resolve_location(cli: &Cli) -> ResolvedLocation {
    // Explicit coordinates bypass the tiers entirely.
    if let (Some(lat), Some(lon)) = (cli.lat, cli.lon) {
        let coord = GeoCoordinate::new(lat, lon);
        coord.validate().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        return ResolvedLocation {
            coordinates: coord,
            source: LocationSource::Manual,
        };
    }

    if cli.lat.is_some() != cli.lon.is_some() {
        eprintln!("Error: Provide both --lat and --lon, or neither");
        std::process::exit(1);
    }

    LocationResolver::new()
        .resolve(!cli.no_default)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        })
}
