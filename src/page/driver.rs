use std::path::PathBuf;
use std::sync::Arc;

use async_std::channel::{self, Receiver, Sender};
use async_std::io::prelude::BufReadExt;
use async_std::task;
use futures_lite::stream::StreamExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{Command, Event, Page, UserAction};
use crate::api::GalleryApi;
use crate::carousel::Scheduler;
use crate::gallery::GalleryStore;
use crate::view::{Renderer, TemplateError};

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("could not render page")]
    Template(#[from] TemplateError),
    #[error("could not write rendered page")]
    Io(#[from] std::io::Error),
}

/// Creates the page's event channel. Timers, fetches and input all post into it.
pub fn event_channel() -> (Sender<Event>, Receiver<Event>) {
    channel::unbounded()
}

/// Single event loop for one page: handles events in arrival order, runs the
/// resulting commands and writes the rendered page after every event.
pub struct Driver<S> {
    page: Page<S>,
    api: Arc<dyn GalleryApi>,
    renderer: Renderer,
    output: PathBuf,
    sender: Sender<Event>,
    receiver: Receiver<Event>,
}

impl<S: Scheduler> Driver<S> {
    pub fn new(
        page: Page<S>,
        api: Arc<dyn GalleryApi>,
        renderer: Renderer,
        output: PathBuf,
        (sender, receiver): (Sender<Event>, Receiver<Event>),
    ) -> Self {
        Driver {
            page,
            api,
            renderer,
            output,
            sender,
            receiver,
        }
    }

    pub fn sender(&self) -> Sender<Event> {
        self.sender.clone()
    }

    /// Runs until a quit action, then returns the torn-down page.
    pub async fn run(mut self) -> Result<Page<S>, DriverError> {
        let commands = self.page.start();
        self.execute(commands);
        self.publish().await?;

        while let Ok(event) = self.receiver.recv().await {
            let commands = self.page.handle(event);
            if commands.contains(&Command::Shutdown) {
                info!("page shutting down");
                break;
            }
            self.execute(commands);
            self.publish().await?;
        }

        self.page.teardown();
        Ok(self.page)
    }

    fn execute(&self, commands: Vec<Command>) {
        for command in commands {
            let api = self.api.clone();
            let sender = self.sender.clone();

            match command {
                Command::FetchCategories => {
                    task::spawn(async move {
                        let result = GalleryStore::fetch_categories(api.as_ref()).await;
                        let _ = sender.send(Event::CategoriesLoaded(result)).await;
                    });
                },
                Command::FetchGallery(ticket) => {
                    task::spawn(async move {
                        let result = GalleryStore::fetch_gallery(api.as_ref(), &ticket).await;
                        let _ = sender.send(Event::GalleryLoaded { ticket, result }).await;
                    });
                },
                Command::Shutdown => {},
            }
        }
    }

    async fn publish(&self) -> Result<(), DriverError> {
        let html = self.renderer.render_page(&self.page.view())?;
        async_std::fs::write(&self.output, html).await?;
        debug!(output = %self.output.display(), "page rendered");
        Ok(())
    }
}

/// Feeds stdin lines to the page as user actions. End of input quits.
pub async fn read_console(sender: Sender<Event>) {
    let stdin = async_std::io::BufReader::new(async_std::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next().await {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(%err, "could not read console input");
                break;
            },
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<UserAction>() {
            Ok(action) => {
                if sender.send(Event::User(action)).await.is_err() {
                    return;
                }
            },
            Err(err) => warn!(%err, "ignoring console input"),
        }
    }

    let _ = sender.send(Event::User(UserAction::Quit)).await;
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::api::testing::{photos, CannedApi};
    use crate::carousel::timer::testing::CountingScheduler;
    use crate::page::PageConfig;

    fn output_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vitrine_driver_{}_{}.html", name, std::process::id()))
    }

    #[async_std::test]
    async fn loads_renders_and_shuts_down() {
        let api = CannedApi::default()
            .with_categories(Ok(vec!["Nature".into(), "Portrait".into()]))
            .with_gallery(Ok(photos(8)));
        let scheduler = CountingScheduler::default();
        let output = output_path("loads");

        let driver = Driver::new(
            Page::new(PageConfig::default(), scheduler.clone()),
            Arc::new(api),
            Renderer::new(None, false).unwrap(),
            output.clone(),
            event_channel(),
        );
        let sender = driver.sender();
        let running = task::spawn(driver.run());

        let mut rendered = String::new();
        for _ in 0..200 {
            rendered = async_std::fs::read_to_string(&output).await.unwrap_or_default();
            if rendered.contains("sliderIndicators") && rendered.contains("Portrait") {
                break;
            }
            task::sleep(Duration::from_millis(10)).await;
        }
        assert!(rendered.contains("data-photo=\"8\""));

        sender.send(Event::User(UserAction::Quit)).await.unwrap();
        let page = running.await.unwrap();

        assert_eq!(page.categories().len(), 2);
        assert_eq!(page.carousel().slides().len(), 0);
        assert_eq!(scheduler.live(), 0);
        assert_eq!(scheduler.max_live(), 1);
        let _ = std::fs::remove_file(&output);
    }

    #[async_std::test]
    async fn failed_load_renders_error_message() {
        let output = output_path("failed");
        let driver = Driver::new(
            Page::new(PageConfig::default(), CountingScheduler::default()),
            Arc::new(CannedApi::default()),
            Renderer::new(None, false).unwrap(),
            output.clone(),
            event_channel(),
        );
        let sender = driver.sender();
        let running = task::spawn(driver.run());

        let mut rendered = String::new();
        for _ in 0..200 {
            rendered = async_std::fs::read_to_string(&output).await.unwrap_or_default();
            if rendered.contains(crate::view::LOAD_FAILED) {
                break;
            }
            task::sleep(Duration::from_millis(10)).await;
        }
        assert!(rendered.contains(crate::view::LOAD_FAILED));

        sender.send(Event::User(UserAction::Quit)).await.unwrap();
        let page = running.await.unwrap();
        assert!(page.categories().is_empty());
        let _ = std::fs::remove_file(&output);
    }
}
