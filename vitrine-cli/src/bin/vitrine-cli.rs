use std::io;

use structopt::StructOpt;

use vitrine::api::{GalleryApi, HttpGalleryApi};
use vitrine::carousel::{CarouselConfig, InertScheduler};
use vitrine::gallery::{filter_by_text, GallerySnapshot};
use vitrine::page::{Event, Page, PageConfig, UserAction};
use vitrine::view::Renderer;
use vitrine_cli::report::{photo_line, CheckReport};

#[derive(StructOpt)]
struct SharedApiArgs {
    /// Gallery backend base URL
    #[structopt(long, env = "VITRINE_ENDPOINT")]
    endpoint: String,
}

impl SharedApiArgs {
    fn client(&self) -> io::Result<HttpGalleryApi> {
        HttpGalleryApi::new(&self.endpoint).map_err(to_io)
    }
}

#[derive(StructOpt)]
pub struct GalleryArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,

    /// Only list photos in this category.
    #[structopt(long)]
    category: Option<String>,

    /// Only list photos whose title contains this text.
    #[structopt(long)]
    search: Option<String>,

    /// Print the records as JSON.
    #[structopt(long)]
    json: bool,
}

#[derive(StructOpt)]
pub struct CheckArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,

    /// Check a single category instead of the whole gallery.
    #[structopt(long)]
    category: Option<String>,
}

#[derive(StructOpt)]
pub struct RenderArgs {
    #[structopt(flatten)]
    api_arguments: SharedApiArgs,

    /// Category selected on the rendered page.
    #[structopt(long)]
    category: Option<String>,

    /// Search text typed into the rendered page.
    #[structopt(long)]
    search: Option<String>,

    /// Max number of grid tiles.
    #[structopt(long)]
    grid_limit: Option<usize>,

    /// Minify the rendered HTML.
    #[structopt(long)]
    minify: bool,

    /// Write the page here instead of stdout.
    #[structopt(long, parse(from_os_str))]
    output: Option<std::path::PathBuf>,
}

#[derive(StructOpt)]
pub enum Command {
    /// List the category labels known to the backend.
    Categories(SharedApiArgs),
    /// List gallery photos.
    Gallery(GalleryArgs),
    /// Report whether the gallery has anything to show.
    Check(CheckArgs),
    /// Render the gallery page once, without the slider running.
    Render(RenderArgs),
}

fn to_io(err: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

async fn list_categories(args: SharedApiArgs) -> io::Result<()> {
    let api = args.client()?;
    let categories = api.get_categories().await.map_err(to_io)?;
    log::debug!("Fetched {} categories", categories.len());

    for category in categories {
        println!("{}", category);
    }

    Ok(())
}

async fn list_gallery(args: GalleryArgs) -> io::Result<()> {
    let api = args.api_arguments.client()?;
    let photos = api
        .get_gallery(args.category.as_deref())
        .await
        .map_err(to_io)?;
    let mut snapshot = GallerySnapshot::from(photos);
    if let Some(query) = args.search.as_deref() {
        snapshot = filter_by_text(&snapshot, query);
    }
    log::debug!("Listing {} photos", snapshot.len());

    if args.json {
        let json = serde_json::to_string_pretty(snapshot.photos()).map_err(to_io)?;
        println!("{}", json);
    } else {
        for photo in snapshot.photos() {
            println!("{}", photo_line(photo));
        }
    }

    Ok(())
}

async fn check_gallery(args: CheckArgs) -> io::Result<()> {
    let api = args.api_arguments.client()?;
    let photos = api
        .get_gallery(args.category.as_deref())
        .await
        .map_err(to_io)?;

    let report = CheckReport::new(&GallerySnapshot::from(photos), CarouselConfig::default());
    println!("{}", report);

    if !report.is_healthy() {
        log::error!("Gallery has no photo with an image url");
        std::process::exit(1);
    }

    Ok(())
}

async fn render_page(args: RenderArgs) -> io::Result<()> {
    let api = args.api_arguments.client()?;
    let renderer = Renderer::new(None, args.minify).map_err(to_io)?;

    let config = PageConfig {
        title: "gallery".to_string(),
        carousel: CarouselConfig::default(),
        grid_limit: args.grid_limit,
        initial_category: args.category.filter(|c| !c.is_empty()),
    };
    let mut page = Page::new(config, InertScheduler::default());
    page.load(&api).await;
    if let Some(query) = args.search {
        page.handle(Event::User(UserAction::Search(query)));
    }

    let html = renderer.render_page(&page.view()).map_err(to_io)?;
    page.teardown();

    match args.output {
        Some(path) => {
            async_std::fs::write(&path, html).await?;
            log::info!("Wrote page to {}", path.display());
        },
        None => println!("{}", html),
    }

    Ok(())
}

#[async_std::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    match Command::from_args() {
        Command::Categories(args) => list_categories(args).await,
        Command::Gallery(args) => list_gallery(args).await,
        Command::Check(args) => check_gallery(args).await,
        Command::Render(args) => render_page(args).await,
    }
}
