//! Auto-advancing slider over the newest photos of a snapshot.
//!
//! Manual navigation (`next_slide`, `prev_slide`, `go_to_slide`) restarts the
//! advance timer so the chosen slide stays up for a full period. Timer ticks
//! advance without restarting it.

use std::time::Duration;

use tracing::{debug, trace};

use crate::gallery::GallerySnapshot;
use vitrine_api_structs::PhotoRecord;

pub mod timer;

pub use timer::{AsyncStdScheduler, InertScheduler, Scheduler, Timer, TimerId};

pub const DEFAULT_MAX_SLIDES: usize = 6;
pub const DEFAULT_ADVANCE_PERIOD: Duration = Duration::from_millis(5000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CarouselConfig {
    pub max_slides: usize,
    pub advance_period: Duration,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        CarouselConfig {
            max_slides: DEFAULT_MAX_SLIDES,
            advance_period: DEFAULT_ADVANCE_PERIOD,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CarouselState {
    Empty,
    /// One slide: no controls, no timer.
    IdleSingle,
    Playing,
}

#[derive(Debug)]
enum Playback {
    Empty,
    IdleSingle,
    Playing { timer: Timer },
}

pub struct CarouselController<S> {
    config: CarouselConfig,
    scheduler: S,
    slides: Vec<PhotoRecord>,
    active: usize,
    playback: Playback,
}

impl<S: Scheduler> CarouselController<S> {
    pub fn new(config: CarouselConfig, scheduler: S) -> Self {
        CarouselController {
            config,
            scheduler,
            slides: Vec::new(),
            active: 0,
            playback: Playback::Empty,
        }
    }

    pub fn state(&self) -> CarouselState {
        match self.playback {
            Playback::Empty => CarouselState::Empty,
            Playback::IdleSingle => CarouselState::IdleSingle,
            Playback::Playing { .. } => CarouselState::Playing,
        }
    }

    pub fn slides(&self) -> &[PhotoRecord] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&PhotoRecord> {
        self.slides.get(index)
    }

    pub fn active_index(&self) -> Option<usize> {
        if self.slides.is_empty() {
            None
        } else {
            Some(self.active)
        }
    }

    pub fn timer_id(&self) -> Option<TimerId> {
        match &self.playback {
            Playback::Playing { timer } => Some(timer.id()),
            _ => None,
        }
    }

    /// Rebuilds the slides from a new snapshot.
    pub fn load(&mut self, snapshot: &GallerySnapshot) {
        self.disarm();

        self.slides = snapshot.most_recent(self.config.max_slides);
        self.active = 0;
        self.playback = match self.slides.len() {
            0 => Playback::Empty,
            1 => Playback::IdleSingle,
            _ => Playback::Playing {
                timer: self.scheduler.arm(self.config.advance_period),
            },
        };

        debug!(slides = self.slides.len(), state = ?self.state(), "carousel loaded");
    }

    pub fn next_slide(&mut self) {
        if self.step(true) {
            self.restart_timer();
        }
    }

    pub fn prev_slide(&mut self) {
        if self.step(false) {
            self.restart_timer();
        }
    }

    pub fn go_to_slide(&mut self, index: usize) {
        if self.slides.is_empty() {
            return;
        }
        self.active = index % self.slides.len();
        self.restart_timer();
    }

    /// Auto-advance. Ticks from a timer that has since been cancelled are ignored.
    pub fn tick(&mut self, id: TimerId) {
        if self.timer_id() != Some(id) {
            trace!(timer = id.0, "ignoring tick from cancelled timer");
            return;
        }
        self.step(true);
    }

    pub fn teardown(&mut self) {
        self.slides.clear();
        self.disarm();
        self.active = 0;
    }

    fn step(&mut self, forward: bool) -> bool {
        let len = self.slides.len();
        if len == 0 {
            return false;
        }
        self.active = if forward {
            (self.active + 1) % len
        } else {
            (self.active + len - 1) % len
        };
        true
    }

    fn restart_timer(&mut self) {
        if let Playback::Playing { .. } = self.playback {
            self.disarm();
            self.playback = Playback::Playing {
                timer: self.scheduler.arm(self.config.advance_period),
            };
        }
    }

    /// Drops the live timer, if any, before anything new is armed.
    fn disarm(&mut self) {
        self.playback = match self.slides.len() {
            0 => Playback::Empty,
            _ => Playback::IdleSingle,
        };
    }
}
