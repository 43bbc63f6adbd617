use crate::client::models::{GeoSuggestion, GeoUnit};
use crate::client::client::should_suggest;
use crate::client::ApiClient;
use crate::config::Config;
use crate::domain::{Coordinates, FilterSet, ListingId, RangeField, SortKey};
use crate::driver::Session;
use crate::engine::{BrowseEngine, CollectionKind, LayerId, LocalSort, MemoryMap};
use crate::errors::AppError;
use crate::templates::pages::browse_page;
use crate::templates::CardView;
use clap::{Args, Parser, Subcommand};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{error, info};

mod client;
mod config;
mod domain;
mod driver;
mod engine;
mod errors;
mod templates;


#[derive(Parser, Debug)]
#[command(name = "flat_scout", about = "Browse saved and searched flats")]
struct Cli {
    /// Overrides FLAT_SCOUT_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: CommandArg,
}

#[derive(Subcommand, Debug)]
enum CommandArg {
    /// Load saves, run a search and render both collections
    Browse(BrowseArgs),
    /// Geolocation suggestions for one unit (state, locality, county)
    Suggest {
        unit: String,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        locality: Option<String>,
        #[arg(long)]
        county: Option<String>,
    },
    /// Detail suggestions for a prefix
    Details { value: String },
    /// Total number of flats on the server
    Summary,
}

#[derive(Args, Debug, Default)]
struct BrowseArgs {
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    locality: Option<String>,
    #[arg(long)]
    county: Option<String>,

    /// Range bound, e.g. `--from area=40`
    #[arg(long = "from", value_parser = parse_bound)]
    from: Vec<(RangeField, f64)>,
    /// Range bound, e.g. `--to rooms=3`
    #[arg(long = "to", value_parser = parse_bound)]
    to: Vec<(RangeField, f64)>,

    #[arg(long = "detail")]
    details: Vec<String>,

    /// area, -area, rooms, -rooms, price, -price
    #[arg(long, value_parser = parse_sort)]
    order_by: Option<SortKey>,

    /// How many times to activate "load more"
    #[arg(long, default_value_t = 0)]
    pages: u32,

    /// Save a listing from the search results by id
    #[arg(long)]
    save: Vec<i64>,

    /// Remove a listing from the saves by id
    #[arg(long)]
    remove: Vec<i64>,

    /// Reorder search results locally: price, area or rooms
    #[arg(long, value_parser = parse_local_sort)]
    sort_by: Option<LocalSort>,

    /// Focus the map on a listing, searched first, then saved
    #[arg(long)]
    show: Option<i64>,

    /// Place the search circle, `LAT,LON`
    #[arg(long, value_parser = parse_point)]
    circle: Option<Coordinates>,
    /// Stretch the search circle to this point, `LAT,LON`
    #[arg(long, value_parser = parse_point, requires = "circle")]
    circle_edge: Option<Coordinates>,

    /// Write the rendered page here
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_bound(raw: &str) -> Result<(RangeField, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got {raw:?}"))?;

    let field = RangeField::ALL
        .into_iter()
        .find(|f| f.name() == name)
        .ok_or_else(|| format!("unknown range field {name:?}"))?;

    let value = value
        .parse::<f64>()
        .map_err(|_| format!("not a number: {value:?}"))?;

    // negative bounds are stripped by the filter inputs
    Ok((field, value.abs()))
}

fn parse_sort(raw: &str) -> Result<SortKey, String> {
    SortKey::parse(raw).ok_or_else(|| format!("unknown sort key {raw:?}"))
}

fn parse_point(raw: &str) -> Result<Coordinates, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {raw:?}"))?;
    let number = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|_| format!("not a number: {v:?}"))
    };
    Ok(Coordinates::new(number(lat)?, number(lon)?))
}

fn parse_local_sort(raw: &str) -> Result<LocalSort, String> {
    LocalSort::parse(raw).ok_or_else(|| format!("unknown local sort {raw:?}"))
}

impl BrowseArgs {
    fn filters(&self) -> FilterSet {
        let mut filters = FilterSet {
            state: self.state.clone(),
            locality: self.locality.clone(),
            county: self.county.clone(),
            order_by: self.order_by,
            ..FilterSet::default()
        };

        for (field, value) in &self.from {
            let to = filters.range(*field).to;
            filters.set_range(*field, Some(*value), to);
        }
        for (field, value) in &self.to {
            let from = filters.range(*field).from;
            filters.set_range(*field, from, Some(*value));
        }

        self.details
            .iter()
            .fold(filters, |f, detail| f.with_detail(detail.as_str()))
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,flat_scout=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url)?;
    }
    let client = ApiClient::new(&config)?;

    match cli.command {
        CommandArg::Browse(args) => browse(client, &args),
        CommandArg::Suggest {
            unit,
            state,
            locality,
            county,
        } => {
            let unit = GeoUnit::parse(&unit)
                .ok_or_else(|| AppError::BadArgument(format!("unknown unit {unit:?}")))?;
            let prefix = GeoSuggestion {
                state,
                locality,
                county,
            };
            if !should_suggest(unit.pick(&prefix).unwrap_or_default()) {
                return Ok(());
            }
            for value in client.geolocation_autocomplete(&prefix, unit)? {
                println!("{value}");
            }
            Ok(())
        }
        CommandArg::Details { value } => {
            if !should_suggest(&value) {
                return Ok(());
            }
            for value in client.detail_autocomplete(&value)? {
                println!("{value}");
            }
            Ok(())
        }
        CommandArg::Summary => {
            let summary = client.summary()?;
            println!("{}", summary.total_flats);
            Ok(())
        }
    }
}

fn browse(client: ApiClient, args: &BrowseArgs) -> Result<(), AppError> {
    let view = Rc::new(RefCell::new(CardView::new()));
    let mut session = Session::new(Arc::new(client), MemoryMap::new());
    session.engine_mut().subscribe(Box::new(Rc::clone(&view)));

    session.engine_mut().load_saved();
    if let Err(e) = session.engine_mut().start_new_search(args.filters()) {
        return Err(AppError::BadArgument(e.to_string()));
    }
    session.run_until_idle();

    for _ in 0..args.pages {
        if !session.engine_mut().load_more() {
            break;
        }
        session.run_until_idle();
    }

    session.retry_failed_search();

    for id in &args.save {
        if !session.engine_mut().save_from_search(ListingId(*id)) {
            info!(id = *id, "not in search results, skipped");
        }
    }
    for id in &args.remove {
        session.engine_mut().remove(ListingId(*id));
    }
    if let Some(key) = args.sort_by {
        session.engine_mut().sort(CollectionKind::Search, key);
    }
    session.run_until_idle();

    if let Some(id) = args.show {
        focus_listing(session.engine_mut(), ListingId(id));
    }
    if let Some(center) = args.circle {
        let engine = session.engine_mut();
        engine.set_layer_visible(LayerId::SearchCircle, true);
        engine.map_clicked(center, false);
        if let Some(edge) = args.circle_edge {
            engine.map_clicked(edge, true);
        }
        let circle = engine.overlay().circle();
        info!(
            lat = circle.center.lat,
            lon = circle.center.lon,
            radius_m = circle.radius_m,
            "search circle placed"
        );
    }

    for notice in session.engine_mut().drain_notices() {
        println!("{}", notice.message());
    }

    let engine = session.engine();
    info!(
        saved = engine.saved().len(),
        search = engine.search().len(),
        offset = engine.cursor().page_offset(),
        state = ?engine.cursor().state(),
        "browse finished"
    );

    for kind in [CollectionKind::Saved, CollectionKind::Search] {
        let collection = engine.collection(kind);
        println!("== {kind:?} ({})", collection.len());
        for listing in collection.entries() {
            println!(
                "{:>8}  {:<40}  {}",
                listing.id.0,
                listing.details.address.line(),
                listing
                    .details
                    .price
                    .map(templates::format_price)
                    .unwrap_or_else(|| "-".to_string())
            );
        }
        if let Some(message) = collection.empty_message() {
            println!("{message}");
        }
    }

    if let Some(path) = &args.out {
        let page = browse_page(engine, &view.borrow());
        std::fs::write(path, page.into_string())?;
        info!(path = %path.display(), "page written");
    }

    Ok(())
}

fn focus_listing(engine: &mut BrowseEngine<MemoryMap>, id: ListingId) {
    let handle = [CollectionKind::Search, CollectionKind::Saved]
        .into_iter()
        .find_map(|kind| engine.show_on_map(kind, id));

    match handle.and_then(|h| engine.activate_marker(h)) {
        Some((kind, id)) => info!(id = id.0, ?kind, "map focused on listing"),
        None => info!(id = id.0, "no marker for listing, nothing to focus"),
    }
}
