//! Carousel navigation: single-flight moves with eased scroll and slide animations.

mod animation;
mod carousel;
mod controller;

pub use animation::{ease_out_cubic, run_tween, Tween};
pub use carousel::{Carousel, Row, SlideDirection, SlideState, TrackCarousel};
pub use controller::{Move, NavOutcome, NavPhase, NavigationController, PendingView};
