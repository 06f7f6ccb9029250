//! # Events Module
//!
//! Progress reporting decoupled from presentation.
//!
//! The pipeline emits events through a channel; the CLI drains them on a
//! separate thread to drive its progress bar.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Plan(PlanEvent::Import { source, destination }) = event {
//!             println!("{} -> {}", source.display(), destination.display());
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
