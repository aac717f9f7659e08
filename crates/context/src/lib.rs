//! Calendar context awareness for cadence.
//!
//! This crate turns a list of calendar events into the three-slot meeting
//! context that drives mode selection. It owns:
//! - The domain vocabulary (modes, confidence, layout hints)
//! - Timing configuration and its validation
//! - Context resolution (current / next / last meeting)
//! - Boundary polling (when does the context next change)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  mode.rs     - Mode, Confidence, LayoutHint (pure)          │
//! │  state.rs    - CalendarEvent, MeetingContext structs        │
//! │  timing.rs   - TimingConfig and validation                  │
//! │  resolver.rs - Slot resolution and boundary math (pure)     │
//! │  provider.rs - Traits for calendar input and time           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Application Layer                          │
//! │  poller.rs - Background polling and boundary emission       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use cadence_context::{resolve_context, CalendarEvent, TimingConfig};
//!
//! let now = 1_700_000_000_000;
//! let events = vec![CalendarEvent::new("1", "Standup", now - 60_000, now + 900_000)];
//! let context = resolve_context(&events, now, &TimingConfig::default());
//! assert_eq!(context.current_meeting.unwrap().id, "1");
//! ```

mod error;
mod mode;
mod poller;
mod provider;
mod resolver;
mod state;
mod timing;

pub mod limits;

// Re-export main types
pub use error::ConfigError;
pub use mode::{Confidence, LayoutHint, Mode};
pub use poller::{BoundaryCallback, BoundaryPoller, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL};
pub use provider::{CalendarProvider, Clock, ManualClock, NullProvider, StaticProvider, SystemClock};
pub use resolver::{next_boundary, resolve_context};
pub use state::{BoundaryChangedEvent, CalendarEvent, MeetingContext, SlotIds};
pub use timing::{
    TimingConfig, DEFAULT_MEETING_GRACE_MINUTES, DEFAULT_MINIMUM_HOLD_MS,
    DEFAULT_PREP_WINDOW_MINUTES, DEFAULT_SYNTHESIS_WINDOW_MINUTES,
};
