//! Story playback state machine.
//!
//! DESIGN
//! ======
//! The web client historically drove story advancement with an interval
//! timer plus ad-hoc touch handlers (a cancellable long-press timeout and
//! manual swipe-distance checks), re-implemented slightly differently in
//! each revision. This module is the single authoritative expression of that
//! behavior: a touch goes Idle -> Holding -> (Paused | Swiping), and the
//! play clock only runs while nothing holds it.
//!
//! All time enters as a caller-supplied offset from session start, so the
//! module owns no timers and tests drive the clock directly.

use std::time::Duration;

use uuid::Uuid;

/// Fixed play time for image and text slides.
pub const IMAGE_SLIDE_DURATION: Duration = Duration::from_secs(5);
/// Hold time before a touch counts as a pause rather than a tap.
pub const HOLD_PAUSE_DELAY: Duration = Duration::from_millis(200);
/// Horizontal travel, in pixels, before a touch becomes a swipe.
pub const SWIPE_THRESHOLD_PX: f64 = 50.0;

/// Holding only pauses when the touch starts in the central band of the
/// screen; the outer quarters are the tap-navigation zones.
const CENTER_REGION_START: f64 = 0.25;
const CENTER_REGION_END: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKind {
    Image,
    Video,
    Text,
}

impl SlideKind {
    /// Parse the stored `media_type` column value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Slide {
    pub story_id: Uuid,
    pub kind: SlideKind,
    /// Natural video length; ignored for image and text slides.
    pub video_duration: Option<Duration>,
}

impl Slide {
    /// How long this slide plays before auto-advancing.
    #[must_use]
    pub fn play_time(&self) -> Duration {
        match self.kind {
            SlideKind::Video => self.video_duration.unwrap_or(IMAGE_SLIDE_DURATION),
            SlideKind::Image | SlideKind::Text => IMAGE_SLIDE_DURATION,
        }
    }
}

/// One user's run of active stories, in playback order.
#[derive(Debug, Clone)]
pub struct OwnerSlides {
    pub user_id: Uuid,
    pub slides: Vec<Slide>,
}

/// Where the session currently points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub user_id: Uuid,
    pub story_id: Uuid,
    pub owner_index: usize,
    pub slide_index: usize,
}

/// Result of an input that moved the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved(Position),
    /// Ran past either end of the session.
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TouchState {
    Idle,
    Holding { since: Duration, origin: f64, travel: f64 },
    Swiping { travel: f64 },
}

#[derive(Debug)]
pub struct Playback {
    owners: Vec<OwnerSlides>,
    owner_index: usize,
    slide_index: usize,
    /// Play time accumulated on the current slide while the clock ran.
    played: Duration,
    /// Offset of the last resume; `None` while paused or ended.
    running_since: Option<Duration>,
    touch: TouchState,
    ended: bool,
}

impl Playback {
    /// Start a session over the given owners. Owners without slides are
    /// dropped; returns `None` when nothing is playable.
    #[must_use]
    pub fn new(owners: Vec<OwnerSlides>, now: Duration) -> Option<Self> {
        let owners: Vec<OwnerSlides> = owners.into_iter().filter(|o| !o.slides.is_empty()).collect();
        if owners.is_empty() {
            return None;
        }
        Some(Self {
            owners,
            owner_index: 0,
            slide_index: 0,
            played: Duration::ZERO,
            running_since: Some(now),
            touch: TouchState::Idle,
            ended: false,
        })
    }

    #[must_use]
    pub fn position(&self) -> Option<Position> {
        if self.ended {
            return None;
        }
        Some(self.position_unchecked())
    }

    fn position_unchecked(&self) -> Position {
        let owner = &self.owners[self.owner_index];
        Position {
            user_id: owner.user_id,
            story_id: owner.slides[self.slide_index].story_id,
            owner_index: self.owner_index,
            slide_index: self.slide_index,
        }
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        !self.ended && self.running_since.is_none()
    }

    fn current_slide(&self) -> &Slide {
        &self.owners[self.owner_index].slides[self.slide_index]
    }

    fn elapsed(&self, now: Duration) -> Duration {
        match self.running_since {
            Some(since) => self.played + now.saturating_sub(since),
            None => self.played,
        }
    }

    /// Fraction of the current slide already played, in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self, now: Duration) -> f64 {
        if self.ended {
            return 1.0;
        }
        let play_time = self.current_slide().play_time();
        if play_time.is_zero() {
            return 1.0;
        }
        (self.elapsed(now).as_secs_f64() / play_time.as_secs_f64()).min(1.0)
    }

    /// Stop the play clock. The caller pauses any playing video alongside.
    pub fn pause(&mut self, now: Duration) {
        if self.ended {
            return;
        }
        if let Some(since) = self.running_since.take() {
            self.played += now.saturating_sub(since);
        }
    }

    pub fn resume(&mut self, now: Duration) {
        if self.ended || self.running_since.is_some() {
            return;
        }
        self.running_since = Some(now);
    }

    /// Drive the clock. Engages the hold-pause once the delay passes and
    /// auto-advances when the slide's play time is exhausted.
    pub fn tick(&mut self, now: Duration) -> Option<Transition> {
        if self.ended {
            return None;
        }

        if let TouchState::Holding { since, origin, .. } = self.touch {
            if in_center(origin) && now.saturating_sub(since) >= HOLD_PAUSE_DELAY {
                self.pause(now);
            }
        }

        if self.running_since.is_some() && self.elapsed(now) >= self.current_slide().play_time() {
            return Some(self.advance(now));
        }
        None
    }

    /// Move to the next slide, crossing to the next owner's first slide at
    /// the end of a run; past the last owner the session ends.
    pub fn advance(&mut self, now: Duration) -> Transition {
        if self.ended {
            return Transition::Ended;
        }
        if self.slide_index + 1 < self.owners[self.owner_index].slides.len() {
            self.slide_index += 1;
        } else if self.owner_index + 1 < self.owners.len() {
            self.owner_index += 1;
            self.slide_index = 0;
        } else {
            return self.end();
        }
        self.restart_clock(now);
        Transition::Moved(self.position_unchecked())
    }

    /// Move back one slide; at the start of a run, to the previous owner's
    /// last slide; before the very first slide the session ends.
    pub fn back(&mut self, now: Duration) -> Transition {
        if self.ended {
            return Transition::Ended;
        }
        if self.slide_index > 0 {
            self.slide_index -= 1;
        } else if self.owner_index > 0 {
            self.owner_index -= 1;
            self.slide_index = self.owners[self.owner_index].slides.len() - 1;
        } else {
            return self.end();
        }
        self.restart_clock(now);
        Transition::Moved(self.position_unchecked())
    }

    fn end(&mut self) -> Transition {
        self.ended = true;
        self.running_since = None;
        self.touch = TouchState::Idle;
        Transition::Ended
    }

    fn restart_clock(&mut self, now: Duration) {
        self.played = Duration::ZERO;
        self.running_since = Some(now);
    }

    // =========================================================================
    // TOUCH INPUT
    // =========================================================================

    /// Begin a touch at `origin`, the horizontal position as a fraction of
    /// the screen width (`0.0` left edge, `1.0` right edge).
    pub fn touch_start(&mut self, origin: f64, now: Duration) {
        if self.ended {
            return;
        }
        self.touch = TouchState::Holding { since: now, origin, travel: 0.0 };
    }

    /// Update the touch with its total horizontal displacement in pixels
    /// (negative values travel left).
    pub fn touch_move(&mut self, travel: f64, now: Duration) {
        if self.ended {
            return;
        }
        match self.touch {
            TouchState::Holding { .. } if travel.abs() >= SWIPE_THRESHOLD_PX => {
                // Crossing the threshold cancels any pending or engaged hold.
                self.resume(now);
                self.touch = TouchState::Swiping { travel };
            }
            TouchState::Holding { since, origin, .. } => {
                self.touch = TouchState::Holding { since, origin, travel };
            }
            TouchState::Swiping { .. } => {
                self.touch = TouchState::Swiping { travel };
            }
            TouchState::Idle => {}
        }
    }

    /// End the touch: a swipe navigates, a released hold resumes, and a
    /// short tap in the side quarters navigates by zone.
    pub fn touch_end(&mut self, now: Duration) -> Option<Transition> {
        if self.ended {
            return None;
        }
        let touch = std::mem::replace(&mut self.touch, TouchState::Idle);
        match touch {
            TouchState::Swiping { travel } => {
                if travel <= -SWIPE_THRESHOLD_PX {
                    Some(self.advance(now))
                } else if travel >= SWIPE_THRESHOLD_PX {
                    Some(self.back(now))
                } else {
                    // Travelled back under the threshold before release.
                    None
                }
            }
            TouchState::Holding { since, origin, .. } => {
                if now.saturating_sub(since) >= HOLD_PAUSE_DELAY {
                    self.resume(now);
                    None
                } else if origin < CENTER_REGION_START {
                    Some(self.back(now))
                } else if origin >= CENTER_REGION_END {
                    Some(self.advance(now))
                } else {
                    None
                }
            }
            TouchState::Idle => None,
        }
    }
}

fn in_center(origin: f64) -> bool {
    (CENTER_REGION_START..CENTER_REGION_END).contains(&origin)
}

#[cfg(test)]
#[path = "playback_test.rs"]
mod tests;
