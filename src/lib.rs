use std::sync::Arc;
use std::time::Duration;

use structopt::StructOpt;

pub mod api;
pub mod carousel;
pub mod gallery;
pub mod overlay;
pub mod page;
pub mod telemetry;
pub mod view;

use api::{HttpGalleryApi, NetworkError};
use carousel::{AsyncStdScheduler, CarouselConfig};
use page::driver::{self, Driver, DriverError};
use page::{Event, Page, PageConfig};
use view::{Renderer, TemplateError};

#[derive(Debug)]
pub enum Error {
    TemplateParseError(TemplateError),
    TelemetryInitError(anyhow::Error),
    InvalidEndpoint(NetworkError),
    DriverError(DriverError),
}

impl From<Error> for i32 {
    fn from(error: Error) -> i32 {
        match error {
            Error::TemplateParseError(_) => 3,
            Error::TelemetryInitError(_) => 4,
            Error::InvalidEndpoint(_) => 5,
            Error::DriverError(_) => 6,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TemplateParseError(err) => {
                write!(f, "Template parsing error: {}", err)
            },
            Error::TelemetryInitError(err) => {
                write!(f, "Failed to init telemetry: {}", err)
            },
            Error::InvalidEndpoint(err) => {
                write!(f, "Invalid gallery endpoint: {}", err)
            },
            Error::DriverError(err) => {
                write!(f, "Page stopped: {}", err)
            },
        }
    }
}

#[derive(Debug, StructOpt)]
pub struct Args {
    /// Base URL of the gallery backend.
    #[structopt(long, default_value = "http://localhost:5000", env = "VITRINE_ENDPOINT")]
    endpoint: String,

    /// Milliseconds between automatic slide advances.
    #[structopt(
        long,
        default_value = "5000",
        env = "VITRINE_SLIDE_PERIOD_MS",
        parse(try_from_str = parse_period_ms)
    )]
    slide_period_ms: u64,

    /// Number of newest photos shown in the slider.
    #[structopt(long, default_value = "6", env = "VITRINE_MAX_SLIDES")]
    max_slides: usize,

    /// Max number of tiles in the grid, e.g. 4 for the home page preview.
    #[structopt(long, env = "VITRINE_GRID_LIMIT")]
    grid_limit: Option<usize>,

    /// Category selected when the page opens.
    #[structopt(long, env = "VITRINE_CATEGORY")]
    category: Option<String>,

    /// Page title
    #[structopt(long, default_value = "gallery", env = "VITRINE_TITLE")]
    title: String,

    /// Directory with Tera templates overriding the bundled ones
    #[structopt(long, parse(from_os_str), env = "VITRINE_TEMPLATE_PATH")]
    template_path: Option<std::path::PathBuf>,

    /// File the rendered page is written to after every event.
    #[structopt(
        long,
        parse(from_os_str),
        default_value = "./vitrine.html",
        env = "VITRINE_OUTPUT"
    )]
    output: std::path::PathBuf,

    /// Minify the rendered HTML.
    #[structopt(long)]
    minify: bool,

    /// Log as JSON lines instead of plain text.
    #[structopt(long)]
    log_json: bool,
}

fn parse_period_ms(raw: &str) -> Result<u64, String> {
    match raw.parse::<u64>() {
        Ok(0) => Err("the slide period must be at least 1 ms".to_string()),
        Ok(ms) => Ok(ms),
        Err(err) => Err(err.to_string()),
    }
}

impl Args {
    pub fn page_config(&self) -> PageConfig {
        PageConfig {
            title: self.title.clone(),
            carousel: CarouselConfig {
                max_slides: self.max_slides,
                advance_period: Duration::from_millis(self.slide_period_ms),
            },
            grid_limit: self.grid_limit,
            initial_category: self.category.clone().filter(|c| !c.is_empty()),
        }
    }
}

pub async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let args = Args::from_args();

    telemetry::init(args.log_json).map_err(Error::TelemetryInitError)?;

    let api = HttpGalleryApi::new(&args.endpoint).map_err(Error::InvalidEndpoint)?;
    let renderer = Renderer::new(args.template_path.as_deref(), args.minify)
        .map_err(Error::TemplateParseError)?;

    let (sender, receiver) = driver::event_channel();
    let scheduler = AsyncStdScheduler::new(sender.clone(), Event::Tick);
    let page = Page::new(args.page_config(), scheduler);

    tracing::info!(
        endpoint = %args.endpoint,
        output = %args.output.display(),
        "page started, reading commands from stdin"
    );
    async_std::task::spawn(driver::read_console(sender.clone()));

    Driver::new(
        page,
        Arc::new(api),
        renderer,
        args.output.clone(),
        (sender, receiver),
    )
    .run()
    .await
    .map_err(Error::DriverError)?;

    Ok(())
}
