//! Slide selection for the stall carousel.
//!
//! [`Carousel`] is the synchronous state machine: index, autoplay flag and
//! the in-progress touch gesture. [`Slideshow`] wraps it with the autoplay
//! timer.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, Notify},
    task::JoinHandle,
};
use tracing::debug;

/// Horizontal travel a swipe must exceed, in pixels.
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Prev,
    ToggleAutoplay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    pub navigation: Option<Navigation>,
    /// The host should suppress the key's default action (page scroll).
    pub prevent_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Carousel {
    index: usize,
    len: usize,
    autoplay: bool,
    touch_start: Option<f64>,
    touch_end: Option<f64>,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Selected slide, or `None` for an empty list.
    pub fn current(&self) -> Option<usize> {
        (self.len > 0).then_some(self.index)
    }

    pub fn select<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        self.current().and_then(|index| items.get(index))
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Autoplay is on and there is something to advance through.
    pub fn autoplay_active(&self) -> bool {
        self.autoplay && self.len > 0
    }

    /// Returns whether the index changed.
    pub fn next(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        self.move_to((self.index + 1) % self.len)
    }

    /// Returns whether the index changed.
    pub fn prev(&mut self) -> bool {
        if self.len == 0 {
            return false;
        }
        self.move_to((self.index + self.len - 1) % self.len)
    }

    /// Flips autoplay and returns the new setting. Like every other
    /// transition it is ignored for an empty list.
    pub fn toggle_autoplay(&mut self) -> bool {
        if self.len == 0 {
            return self.autoplay;
        }
        self.autoplay = !self.autoplay;
        debug!(autoplay = self.autoplay, "autoplay toggled");
        self.autoplay
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let navigation = match key {
            Key::ArrowLeft => Some(Navigation::Prev),
            Key::ArrowRight => Some(Navigation::Next),
            Key::Space => Some(Navigation::ToggleAutoplay),
            Key::Other => None,
        };
        if let Some(navigation) = navigation {
            self.apply(navigation);
        }
        KeyOutcome {
            navigation,
            prevent_default: key == Key::Space,
        }
    }

    pub fn touch_start(&mut self, x: f64) {
        self.touch_start = Some(x);
        self.touch_end = None;
    }

    pub fn touch_move(&mut self, x: f64) {
        if self.touch_start.is_some() {
            self.touch_end = Some(x);
        }
    }

    /// Ends the gesture. Travel strictly beyond the threshold navigates;
    /// a tap with no movement or an empty list does nothing.
    pub fn touch_end(&mut self) -> Option<Navigation> {
        let (start, end) = (self.touch_start.take()?, self.touch_end.take()?);
        if self.len == 0 {
            return None;
        }
        let distance = start - end;
        let navigation = if distance > SWIPE_THRESHOLD_PX {
            Navigation::Next
        } else if distance < -SWIPE_THRESHOLD_PX {
            Navigation::Prev
        } else {
            return None;
        };
        self.apply(navigation);
        Some(navigation)
    }

    /// Adopts a new list length. An index that falls outside it resets to
    /// the first slide.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = 0;
        }
    }

    fn apply(&mut self, navigation: Navigation) -> bool {
        match navigation {
            Navigation::Next => self.next(),
            Navigation::Prev => self.prev(),
            Navigation::ToggleAutoplay => {
                self.toggle_autoplay();
                false
            }
        }
    }

    fn move_to(&mut self, index: usize) -> bool {
        if index == self.index {
            return false;
        }
        debug!(from = self.index, to = index, of = self.len, "slide changed");
        self.index = index;
        true
    }
}

/// A carousel with a running autoplay timer. The timer fires
/// [`Carousel::next`] every `interval` while autoplay is active, restarts its
/// countdown whenever the slide changes, and is stopped on drop.
pub struct Slideshow {
    carousel: Arc<Mutex<Carousel>>,
    interval: Duration,
    restart: Arc<Notify>,
    ticker: Option<JoinHandle<()>>,
}

impl Slideshow {
    pub fn new(len: usize, interval: Duration) -> Self {
        Self {
            carousel: Arc::new(Mutex::new(Carousel::new(len))),
            interval,
            restart: Arc::new(Notify::new()),
            ticker: None,
        }
    }

    pub async fn state(&self) -> Carousel {
        self.carousel.lock().await.clone()
    }

    pub async fn index(&self) -> usize {
        self.carousel.lock().await.index()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub async fn next(&mut self) {
        let changed = self.carousel.lock().await.next();
        self.after_navigation(changed);
    }

    pub async fn prev(&mut self) {
        let changed = self.carousel.lock().await.prev();
        self.after_navigation(changed);
    }

    pub async fn toggle_autoplay(&mut self) -> bool {
        let (enabled, active) = {
            let mut carousel = self.carousel.lock().await;
            (carousel.toggle_autoplay(), carousel.autoplay_active())
        };
        self.sync_ticker(active);
        enabled
    }

    pub async fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let (changed, outcome, active) = {
            let mut carousel = self.carousel.lock().await;
            let before = carousel.index();
            let outcome = carousel.handle_key(key);
            (carousel.index() != before, outcome, carousel.autoplay_active())
        };
        if outcome.navigation == Some(Navigation::ToggleAutoplay) {
            self.sync_ticker(active);
        } else {
            self.after_navigation(changed);
        }
        outcome
    }

    pub async fn touch_start(&self, x: f64) {
        self.carousel.lock().await.touch_start(x);
    }

    pub async fn touch_move(&self, x: f64) {
        self.carousel.lock().await.touch_move(x);
    }

    pub async fn touch_end(&mut self) -> Option<Navigation> {
        let (navigation, changed) = {
            let mut carousel = self.carousel.lock().await;
            let before = carousel.index();
            let navigation = carousel.touch_end();
            (navigation, carousel.index() != before)
        };
        self.after_navigation(changed);
        navigation
    }

    pub async fn set_len(&mut self, len: usize) {
        let active = {
            let mut carousel = self.carousel.lock().await;
            carousel.set_len(len);
            carousel.autoplay_active()
        };
        self.sync_ticker(active);
    }

    fn after_navigation(&self, changed: bool) {
        if changed && self.ticker.is_some() {
            self.restart.notify_one();
        }
    }

    fn sync_ticker(&mut self, active: bool) {
        match (active, self.ticker.is_some()) {
            (true, false) => {
                debug!(interval_ms = self.interval.as_millis() as u64, "autoplay started");
                self.ticker = Some(tokio::spawn(run_autoplay(
                    self.carousel.clone(),
                    self.restart.clone(),
                    self.interval,
                )));
            }
            (false, true) => {
                if let Some(ticker) = self.ticker.take() {
                    ticker.abort();
                }
                debug!("autoplay stopped");
            }
            _ => {}
        }
    }
}

impl Drop for Slideshow {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

async fn run_autoplay(carousel: Arc<Mutex<Carousel>>, restart: Arc<Notify>, interval: Duration) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                let mut carousel = carousel.lock().await;
                if !carousel.autoplay_active() {
                    break;
                }
                carousel.next();
            }
            _ = restart.notified() => {}
        }
    }
}

#[cfg(test)]
#[path = "tests/carousel_tests.rs"]
mod tests;
