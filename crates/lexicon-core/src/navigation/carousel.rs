//! The animated surface the navigation controller drives.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::animation::{run_tween, Tween};

/// One of the three carousel rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Row {
    Parent,
    Siblings,
    Children,
}

impl Row {
    pub const ALL: [Row; 3] = [Row::Parent, Row::Siblings, Row::Children];

    fn index(self) -> usize {
        match self {
            Row::Parent => 0,
            Row::Siblings => 1,
            Row::Children => 2,
        }
    }
}

/// Direction of the vertical content slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    /// New content comes up from below: a child became the focus.
    Up,
    /// New content drops in from above: the parent became the focus.
    Down,
}

/// Trait for the UI surface that performs navigation animations.
///
/// Both methods resolve once, when the animation has finished.
#[async_trait]
pub trait Carousel: Send + Sync {
    /// Scrolls `row` horizontally until `term_id` is centered.
    ///
    /// Must resolve immediately when `term_id` has no position in `row`
    /// (for example, not rendered yet).
    async fn center(&self, row: Row, term_id: &str, duration: Duration);

    /// Slides from the displayed content block to the pending one.
    async fn slide(&self, direction: SlideDirection, duration: Duration);
}

#[derive(Debug, Clone, Default)]
struct RowTrack {
    offset: f64,
    viewport: f64,
    /// Center coordinate of each laid-out item.
    positions: Vec<(String, f64)>,
}

impl RowTrack {
    fn centered_offset(&self, term_id: &str) -> Option<f64> {
        self.positions
            .iter()
            .find(|(id, _)| id == term_id)
            .map(|(_, center)| center - self.viewport / 2.0)
    }
}

/// In-flight vertical slide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideState {
    pub direction: SlideDirection,
    /// 0.0 shows the old block, 1.0 the new one.
    pub progress: f64,
}

/// Reference [`Carousel`] that tracks scroll offsets in layout units.
///
/// A renderer lays out each row with [`TrackCarousel::layout_row`] and
/// samples [`TrackCarousel::offset`] and [`TrackCarousel::slide_state`]
/// every frame.
pub struct TrackCarousel {
    frame: Duration,
    tracks: Mutex<[RowTrack; 3]>,
    slide: Mutex<Option<SlideState>>,
}

impl TrackCarousel {
    pub fn new(frame: Duration) -> Self {
        Self {
            frame,
            tracks: Mutex::new(Default::default()),
            slide: Mutex::new(None),
        }
    }

    /// Records item centers and the visible width for `row`. The current
    /// offset is kept.
    pub fn layout_row(&self, row: Row, positions: Vec<(String, f64)>, viewport: f64) {
        let mut tracks = self.tracks.lock();
        let track = &mut tracks[row.index()];
        track.positions = positions;
        track.viewport = viewport;
    }

    /// Centers `term_id` in `row` without animating.
    pub fn snap_to(&self, row: Row, term_id: &str) -> bool {
        let mut tracks = self.tracks.lock();
        let track = &mut tracks[row.index()];
        match track.centered_offset(term_id) {
            Some(offset) => {
                track.offset = offset;
                true
            }
            None => false,
        }
    }

    pub fn offset(&self, row: Row) -> f64 {
        self.tracks.lock()[row.index()].offset
    }

    pub fn slide_state(&self) -> Option<SlideState> {
        *self.slide.lock()
    }
}

#[async_trait]
impl Carousel for TrackCarousel {
    async fn center(&self, row: Row, term_id: &str, duration: Duration) {
        let (from, to) = {
            let tracks = self.tracks.lock();
            let track = &tracks[row.index()];
            match track.centered_offset(term_id) {
                Some(to) => (track.offset, to),
                None => return,
            }
        };

        run_tween(Tween::new(from, to, duration), self.frame, |v| {
            self.tracks.lock()[row.index()].offset = v;
        })
        .await;
    }

    async fn slide(&self, direction: SlideDirection, duration: Duration) {
        *self.slide.lock() = Some(SlideState {
            direction,
            progress: 0.0,
        });

        run_tween(Tween::new(0.0, 1.0, duration), self.frame, |progress| {
            *self.slide.lock() = Some(SlideState {
                direction,
                progress,
            });
        })
        .await;

        *self.slide.lock() = None;
    }
}
