use std::str::FromStr;

use tracing::{debug, warn};

use crate::api::{GalleryApi, NetworkError};
use crate::carousel::{CarouselConfig, CarouselController, Scheduler, TimerId};
use crate::gallery::{filter_by_text, Applied, FetchTicket, GallerySnapshot, GalleryStore};
use crate::overlay::{Key, Overlay};
use crate::view::{self, CategoryOption, FullscreenView, GridView, ModalView, PageView, SliderView};
use vitrine_api_structs::{CategoryLabel, PhotoRecord};

pub mod driver;

/// Something the user did on the page.
#[derive(Clone, Debug, PartialEq)]
pub enum UserAction {
    /// `None` selects every category.
    SelectCategory(Option<CategoryLabel>),
    Search(String),
    NextSlide,
    PrevSlide,
    GoToSlide(usize),
    OpenPhoto(String),
    OpenSlide(usize),
    CloseModal,
    BackdropClick,
    OpenFullscreen,
    CloseFullscreen,
    Key(Key),
    Quit,
}

#[derive(Debug, PartialEq)]
pub struct ParseActionError(pub String);

impl std::fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown command: {}", self.0)
    }
}

impl std::error::Error for ParseActionError {}

impl FromStr for UserAction {
    type Err = ParseActionError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (command, rest) = match line.find(' ') {
            Some(at) => (&line[..at], &line[at + 1..]),
            None => (line.trim_end(), ""),
        };
        let index = || {
            rest.trim()
                .parse::<usize>()
                .map_err(|_| ParseActionError(line.to_string()))
        };

        let action = match command {
            "category" => {
                let label = rest.trim();
                UserAction::SelectCategory(Some(label.to_string()).filter(|l| !l.is_empty()))
            },
            "search" => UserAction::Search(rest.to_string()),
            "next" => UserAction::NextSlide,
            "prev" => UserAction::PrevSlide,
            "slide" => UserAction::GoToSlide(index()?),
            "open" if !rest.trim().is_empty() => UserAction::OpenPhoto(rest.trim().to_string()),
            "open-slide" => UserAction::OpenSlide(index()?),
            "close" => UserAction::CloseModal,
            "backdrop" => UserAction::BackdropClick,
            "fullscreen" => UserAction::OpenFullscreen,
            "close-fullscreen" => UserAction::CloseFullscreen,
            "key" if !rest.trim().is_empty() => UserAction::Key(Key::from(rest.trim())),
            "quit" | "exit" => UserAction::Quit,
            _ => return Err(ParseActionError(line.to_string())),
        };

        Ok(action)
    }
}

#[derive(Debug)]
pub enum Event {
    User(UserAction),
    Tick(TimerId),
    CategoriesLoaded(Result<Vec<CategoryLabel>, NetworkError>),
    GalleryLoaded {
        ticket: FetchTicket,
        result: Result<GallerySnapshot, NetworkError>,
    },
}

/// Work the page needs done outside the event loop.
#[derive(Debug, PartialEq)]
pub enum Command {
    FetchCategories,
    FetchGallery(FetchTicket),
    Shutdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GridStatus {
    Loading,
    Failed,
    Ready,
}

#[derive(Clone, Debug, Default)]
pub struct PageConfig {
    pub title: String,
    pub carousel: CarouselConfig,
    /// Cap on grid tiles; the home page shows only the first few photos.
    pub grid_limit: Option<usize>,
    pub initial_category: Option<CategoryLabel>,
}

/// All state of one gallery page. Event handlers get it by reference.
pub struct Page<S> {
    config: PageConfig,
    store: GalleryStore,
    carousel: CarouselController<S>,
    overlay: Overlay,
    categories: Vec<CategoryLabel>,
    selected_category: Option<CategoryLabel>,
    search: String,
    grid: GridStatus,
}

impl<S: Scheduler> Page<S> {
    pub fn new(config: PageConfig, scheduler: S) -> Self {
        Page {
            carousel: CarouselController::new(config.carousel, scheduler),
            selected_category: config.initial_category.clone(),
            config,
            store: GalleryStore::new(),
            overlay: Overlay::new(),
            categories: Vec::new(),
            search: String::new(),
            grid: GridStatus::Loading,
        }
    }

    pub fn store(&self) -> &GalleryStore {
        &self.store
    }

    pub fn carousel(&self) -> &CarouselController<S> {
        &self.carousel
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn categories(&self) -> &[CategoryLabel] {
        &self.categories
    }

    /// Initial load: categories and the gallery for the starting category.
    pub fn start(&mut self) -> Vec<Command> {
        self.grid = GridStatus::Loading;
        let ticket = self.store.request(self.selected_category.clone());
        vec![Command::FetchCategories, Command::FetchGallery(ticket)]
    }

    /// Runs the initial load to completion without an event loop.
    pub async fn load(&mut self, api: &dyn GalleryApi) {
        for command in self.start() {
            let event = match command {
                Command::FetchCategories => {
                    Event::CategoriesLoaded(GalleryStore::fetch_categories(api).await)
                },
                Command::FetchGallery(ticket) => {
                    let result = GalleryStore::fetch_gallery(api, &ticket).await;
                    Event::GalleryLoaded { ticket, result }
                },
                Command::Shutdown => continue,
            };
            self.handle(event);
        }
    }

    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::User(action) => return self.handle_action(action),
            Event::Tick(id) => self.carousel.tick(id),
            Event::CategoriesLoaded(Ok(categories)) => self.categories = categories,
            Event::CategoriesLoaded(Err(err)) => {
                warn!(%err, "could not load categories");
                self.categories.clear();
            },
            Event::GalleryLoaded { ticket, result } => self.apply_gallery(&ticket, result),
        }
        Vec::new()
    }

    fn handle_action(&mut self, action: UserAction) -> Vec<Command> {
        debug!(?action, "user action");
        match action {
            UserAction::SelectCategory(category) => {
                self.selected_category = category.filter(|c| !c.is_empty());
                self.grid = GridStatus::Loading;
                let ticket = self.store.request(self.selected_category.clone());
                return vec![Command::FetchGallery(ticket)];
            },
            UserAction::Search(query) => {
                self.search = query;
                if self.store.snapshot().is_some() {
                    self.grid = GridStatus::Ready;
                }
            },
            UserAction::NextSlide => self.carousel.next_slide(),
            UserAction::PrevSlide => self.carousel.prev_slide(),
            UserAction::GoToSlide(index) => self.carousel.go_to_slide(index),
            UserAction::OpenPhoto(raw_id) => {
                let photo = self
                    .store
                    .snapshot()
                    .and_then(|s| s.photos().iter().find(|p| p.id.matches(&raw_id)))
                    .cloned();
                match photo {
                    Some(photo) => self.overlay.open_modal(photo),
                    None => debug!(id = %raw_id, "no such photo"),
                }
            },
            UserAction::OpenSlide(index) => {
                if let Some(photo) = self.carousel.slide(index).cloned() {
                    self.overlay.open_modal(photo);
                }
            },
            UserAction::CloseModal | UserAction::BackdropClick => self.overlay.close_modal(),
            UserAction::OpenFullscreen => self.overlay.open_fullscreen(),
            UserAction::CloseFullscreen => self.overlay.close_fullscreen(),
            UserAction::Key(key) => {
                self.overlay.handle_key(&key);
            },
            UserAction::Quit => {
                self.teardown();
                return vec![Command::Shutdown];
            },
        }
        Vec::new()
    }

    fn apply_gallery(&mut self, ticket: &FetchTicket, result: Result<GallerySnapshot, NetworkError>) {
        match self.store.complete(ticket, result) {
            Applied::Replaced(snapshot) => {
                self.carousel.load(snapshot);
                self.grid = GridStatus::Ready;
            },
            Applied::Failed(_) => self.grid = GridStatus::Failed,
            Applied::Stale => {},
        }
    }

    /// Grid contents for the current snapshot and search query.
    pub fn visible_photos(&self) -> Vec<PhotoRecord> {
        match self.store.snapshot() {
            Some(snapshot) => filter_by_text(snapshot, &self.search).photos().to_vec(),
            None => Vec::new(),
        }
    }

    fn empty_message(&self) -> &'static str {
        if !self.search.trim().is_empty() {
            view::NO_TITLE_MATCH
        } else if self.selected_category.is_some() {
            view::NO_PHOTOS_IN_CATEGORY
        } else {
            view::NO_PHOTOS_YET
        }
    }

    pub fn view(&self) -> PageView {
        let grid = match self.grid {
            GridStatus::Loading => GridView::Loading {
                message: view::LOADING.to_string(),
            },
            GridStatus::Failed => GridView::Failed {
                message: view::LOAD_FAILED.to_string(),
            },
            GridStatus::Ready => GridView::tiles(
                &self.visible_photos(),
                self.config.grid_limit,
                self.empty_message(),
            ),
        };

        let current = self.overlay.current_photo();
        PageView {
            title: self.config.title.clone(),
            categories: self
                .categories
                .iter()
                .map(|label| CategoryOption {
                    label: label.clone(),
                    selected: self.selected_category.as_ref() == Some(label),
                })
                .collect(),
            selected_category: self.selected_category.clone(),
            search: self.search.clone(),
            grid,
            slider: SliderView::project(&self.carousel),
            modal: current.map(ModalView::from),
            fullscreen: current
                .filter(|_| self.overlay.is_fullscreen())
                .map(FullscreenView::from),
            scroll_locked: self.overlay.scroll_locked(),
        }
    }

    /// Releases the timer and closes overlays.
    pub fn teardown(&mut self) {
        self.carousel.teardown();
        self.overlay.close_modal();
    }
}
