//! Read-only projection of the page state and its HTML rendering.
//!
//! Nothing here is ever read back to recover application state.

use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};
use tracing::info;

use crate::carousel::{CarouselController, CarouselState, Scheduler};
use vitrine_api_structs::PhotoRecord;

pub mod utils;

pub use utils::TemplateError;

pub const UNTITLED: &str = "Untitled";
pub const NO_DESCRIPTION: &str = "No description available.";
pub const LOADING: &str = "Loading...";
pub const LOAD_FAILED: &str = "Unable to load the gallery.";
pub const NO_PHOTOS_YET: &str = "No photos yet.";
pub const NO_PHOTOS_IN_CATEGORY: &str = "No photos in this category.";
pub const NO_TITLE_MATCH: &str = "No photo found with this title.";
pub const NO_SLIDES: &str = "No photo available";

const PAGE_TEMPLATES: [(&str, &str); 4] = [
    ("page.html", include_str!("../../templates/page.html")),
    ("slider.html", include_str!("../../templates/slider.html")),
    ("grid.html", include_str!("../../templates/grid.html")),
    ("modal.html", include_str!("../../templates/modal.html")),
];

pub fn display_title(photo: &PhotoRecord) -> &str {
    match photo.title.as_deref() {
        Some(title) if !title.trim().is_empty() => title,
        _ => UNTITLED,
    }
}

pub fn display_description(photo: &PhotoRecord) -> &str {
    match photo.description.as_deref() {
        Some(text) if !text.trim().is_empty() => text,
        _ => NO_DESCRIPTION,
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PageView {
    pub title: String,
    pub categories: Vec<CategoryOption>,
    pub selected_category: Option<String>,
    pub search: String,
    pub grid: GridView,
    pub slider: SliderView,
    pub modal: Option<ModalView>,
    pub fullscreen: Option<FullscreenView>,
    pub scroll_locked: bool,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct CategoryOption {
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GridView {
    Loading { message: String },
    Failed { message: String },
    Empty { message: String },
    Tiles { tiles: Vec<TileView> },
}

impl GridView {
    /// Tiles for every drawable photo, up to `limit`.
    pub fn tiles<'a>(
        photos: impl IntoIterator<Item = &'a PhotoRecord>,
        limit: Option<usize>,
        empty_message: &str,
    ) -> Self {
        let tiles: Vec<_> = photos
            .into_iter()
            .filter(|p| p.has_image())
            .take(limit.unwrap_or(usize::MAX))
            .map(TileView::from)
            .collect();

        if tiles.is_empty() {
            GridView::Empty {
                message: empty_message.to_string(),
            }
        } else {
            GridView::Tiles { tiles }
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct TileView {
    pub id: String,
    pub url: String,
    pub alt: String,
}

impl From<&PhotoRecord> for TileView {
    fn from(photo: &PhotoRecord) -> Self {
        TileView {
            id: photo.id.to_string(),
            url: photo.url.clone(),
            alt: display_title(photo).to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct SliderView {
    pub state: &'static str,
    pub empty_message: String,
    pub slides: Vec<SlideView>,
    pub offset_percent: usize,
    pub indicators: Vec<IndicatorView>,
    /// Previous/next buttons and the indicator strip.
    pub controls_visible: bool,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct SlideView {
    pub index: usize,
    pub url: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct IndicatorView {
    pub index: usize,
    pub active: bool,
}

impl SliderView {
    pub fn project<S: Scheduler>(carousel: &CarouselController<S>) -> Self {
        let state = carousel.state();
        let active = carousel.active_index().unwrap_or(0);

        let slides = carousel
            .slides()
            .iter()
            .enumerate()
            .map(|(index, photo)| SlideView {
                index,
                url: Some(photo.url.clone()).filter(|_| photo.has_image()),
            })
            .collect();

        let controls_visible = state == CarouselState::Playing;
        let indicators = if controls_visible {
            (0..carousel.slides().len())
                .map(|index| IndicatorView {
                    index,
                    active: index == active,
                })
                .collect()
        } else {
            Vec::new()
        };

        SliderView {
            state: match state {
                CarouselState::Empty => "empty",
                CarouselState::IdleSingle => "idle_single",
                CarouselState::Playing => "playing",
            },
            empty_message: NO_SLIDES.to_string(),
            slides,
            offset_percent: active * 100,
            indicators,
            controls_visible,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ModalView {
    pub photo_id: String,
    pub url: String,
    pub title: String,
    pub text: String,
}

impl From<&PhotoRecord> for ModalView {
    fn from(photo: &PhotoRecord) -> Self {
        ModalView {
            photo_id: photo.id.to_string(),
            url: photo.url.clone(),
            title: display_title(photo).to_string(),
            text: display_description(photo).to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct FullscreenView {
    pub url: String,
    pub alt: String,
}

impl From<&PhotoRecord> for FullscreenView {
    fn from(photo: &PhotoRecord) -> Self {
        FullscreenView {
            url: photo.url.clone(),
            alt: match photo.title.as_deref() {
                Some(title) if !title.trim().is_empty() => title.to_string(),
                _ => "Photo".to_string(),
            },
        }
    }
}

pub struct Renderer {
    tera: Tera,
    minify: bool,
}

impl Renderer {
    /// Uses the bundled templates, or every `*.html` under `template_dir` when given.
    pub fn new(template_dir: Option<&Path>, minify: bool) -> Result<Self, TemplateError> {
        let tera = match template_dir {
            Some(dir) => {
                info!(dir = %dir.display(), "loading templates from directory");
                Tera::new(&dir.join("**/*.html").to_string_lossy())?
            },
            None => {
                let mut tera = Tera::default();
                tera.add_raw_templates(PAGE_TEMPLATES.to_vec())?;
                tera
            },
        };

        Ok(Renderer { tera, minify })
    }

    pub fn render_page(&self, view: &PageView) -> Result<String, TemplateError> {
        let context = Context::from_serialize(view)?;
        utils::render(&self.tera, "page.html", &context, self.minify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::photo;
    use crate::carousel::timer::testing::CountingScheduler;
    use crate::carousel::CarouselConfig;

    #[test]
    fn titles_and_descriptions_fall_back() {
        let mut p = photo(1, Some("  "));
        assert_eq!(display_title(&p), UNTITLED);
        assert_eq!(display_description(&p), NO_DESCRIPTION);

        p.title = Some("Quai".into());
        p.description = Some("Au matin".into());
        assert_eq!(display_title(&p), "Quai");
        assert_eq!(display_description(&p), "Au matin");
    }

    #[test]
    fn grid_skips_photos_without_url_and_honours_limit() {
        let mut blank = photo(2, None);
        blank.url.clear();
        let photos = vec![photo(1, None), blank, photo(3, None), photo(4, None), photo(5, None)];

        match GridView::tiles(&photos, Some(3), NO_PHOTOS_YET) {
            GridView::Tiles { tiles } => {
                let ids: Vec<_> = tiles.iter().map(|t| t.id.as_str()).collect();
                assert_eq!(ids, vec!["1", "3", "4"]);
                assert_eq!(tiles[0].alt, UNTITLED);
            },
            other => panic!("expected tiles, got {:?}", other),
        }
    }

    #[test]
    fn grid_with_nothing_drawable_is_empty() {
        let mut blank = photo(1, None);
        blank.url.clear();

        assert_eq!(
            GridView::tiles(&[blank], None, NO_PHOTOS_YET),
            GridView::Empty {
                message: NO_PHOTOS_YET.to_string()
            }
        );
    }

    #[test]
    fn slider_projection_tracks_active_slide() {
        let mut carousel =
            CarouselController::new(CarouselConfig::default(), CountingScheduler::default());
        carousel.load(&crate::api::testing::photos(3).into());
        carousel.next_slide();

        let view = SliderView::project(&carousel);
        assert_eq!(view.state, "playing");
        assert!(view.controls_visible);
        assert_eq!(view.offset_percent, 100);
        let active: Vec<_> = view.indicators.iter().map(|i| i.active).collect();
        assert_eq!(active, vec![false, true, false]);
    }

    #[test]
    fn single_slide_hides_controls() {
        let mut carousel =
            CarouselController::new(CarouselConfig::default(), CountingScheduler::default());
        carousel.load(&crate::api::testing::photos(1).into());

        let view = SliderView::project(&carousel);
        assert_eq!(view.state, "idle_single");
        assert_eq!(view.slides.len(), 1);
        assert!(!view.controls_visible);
        assert!(view.indicators.is_empty());
    }

    #[test]
    fn renders_bundled_templates() {
        let renderer = Renderer::new(None, false).unwrap();
        let photo = photo(9, Some("Pont <Neuf>"));
        let view = PageView {
            title: "gallery".into(),
            categories: vec![CategoryOption {
                label: "Nature".into(),
                selected: true,
            }],
            selected_category: Some("Nature".into()),
            search: String::new(),
            grid: GridView::tiles(std::iter::once(&photo), None, NO_PHOTOS_YET),
            slider: SliderView {
                state: "empty",
                empty_message: NO_SLIDES.into(),
                slides: Vec::new(),
                offset_percent: 0,
                indicators: Vec::new(),
                controls_visible: false,
            },
            modal: Some(ModalView::from(&photo)),
            fullscreen: None,
            scroll_locked: true,
        };

        let html = renderer.render_page(&view).unwrap();
        // tera escapes slashes inside attribute values
        assert!(html.contains("9.jpg"));
        assert!(html.contains("Pont &lt;Neuf&gt;"));
        assert!(html.contains(NO_DESCRIPTION));
        assert!(html.contains(NO_SLIDES));
        assert!(html.contains("overflow: hidden"));
        assert!(!html.contains("prevBtn"));
        assert!(!html.contains("fullscreenContainer"));
    }
}
