//! # Events Module
//!
//! Progress reporting for long-running intake work.
//!
//! Grouping decodes every photo in a batch and the intake pipeline runs
//! identification per group; both report what they are doing through a
//! channel so the CLI (or any other front-end) can draw progress without the
//! core knowing about terminals.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Group(GroupEvent::Progress(p)) = event {
//!             println!("checked {}/{}", p.checked, p.total);
//!         }
//!     }
//! });
//!
//! grouper.group_with_events(&images, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
