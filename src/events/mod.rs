//! # Events Module
//!
//! Event-driven progress reporting.
//!
//! ## Design
//! The core library emits events through channels, allowing any UI
//! (CLI progress bar, log sink, GUI) to subscribe as a passive observer.
//! The default channel is unbounded, so a slow subscriber never stalls
//! the worker pool.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Hash(HashEvent::Progress(p)) = event {
//!             println!("Hashed {}/{}", p.completed, p.total);
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
