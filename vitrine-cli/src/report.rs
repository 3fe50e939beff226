use std::fmt;

use vitrine::carousel::{CarouselConfig, CarouselController, CarouselState, InertScheduler};
use vitrine::gallery::GallerySnapshot;
use vitrine::view::display_title;
use vitrine_api_structs::PhotoRecord;

/// What a page would show for a snapshot, without rendering it.
#[derive(Debug, PartialEq)]
pub struct CheckReport {
    pub photos: usize,
    pub drawable: usize,
    /// Ids of records the grid skips because they have no url.
    pub skipped: Vec<String>,
    pub slides: usize,
    pub carousel: CarouselState,
}

impl CheckReport {
    pub fn new(snapshot: &GallerySnapshot, config: CarouselConfig) -> Self {
        let mut carousel = CarouselController::new(config, InertScheduler::default());
        carousel.load(snapshot);

        let skipped: Vec<_> = snapshot
            .photos()
            .iter()
            .filter(|p| !p.has_image())
            .map(|p| p.id.to_string())
            .collect();

        CheckReport {
            photos: snapshot.len(),
            drawable: snapshot.len() - skipped.len(),
            skipped,
            slides: carousel.slides().len(),
            carousel: carousel.state(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.drawable > 0
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "photos: {}", self.photos)?;
        writeln!(f, "drawable: {}", self.drawable)?;
        if !self.skipped.is_empty() {
            writeln!(f, "skipped (no url): {}", self.skipped.join(", "))?;
        }
        write!(f, "slider: {} slide(s), {:?}", self.slides, self.carousel)
    }
}

/// One tab-separated line per photo: id, title, url, categories.
pub fn photo_line(photo: &PhotoRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        photo.id,
        display_title(photo),
        photo.url,
        photo.categories.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_api_structs::PhotoId;

    fn photo(id: i64, url: &str) -> PhotoRecord {
        PhotoRecord {
            id: PhotoId::Number(id),
            url: url.to_string(),
            title: None,
            description: None,
            categories: vec!["Nature".into(), "Paysage".into()],
        }
    }

    #[test]
    fn reports_drawable_photos_and_slider() {
        let snapshot: GallerySnapshot = (1..=8)
            .map(|i| photo(i, if i == 3 { "" } else { "https://cdn/x.jpg" }))
            .collect::<Vec<_>>()
            .into();

        let report = CheckReport::new(&snapshot, CarouselConfig::default());
        assert_eq!(report.photos, 8);
        assert_eq!(report.drawable, 7);
        assert_eq!(report.skipped, vec!["3".to_string()]);
        assert_eq!(report.slides, 6);
        assert_eq!(report.carousel, CarouselState::Playing);
        assert!(report.is_healthy());
        assert!(report.to_string().contains("skipped (no url): 3"));
    }

    #[test]
    fn empty_gallery_is_unhealthy() {
        let report = CheckReport::new(&GallerySnapshot::default(), CarouselConfig::default());
        assert!(!report.is_healthy());
        assert_eq!(report.carousel, CarouselState::Empty);
    }

    #[test]
    fn photo_lines_are_tab_separated() {
        assert_eq!(
            photo_line(&photo(4, "u")),
            "4\tUntitled\tu\tNature, Paysage"
        );
    }
}
