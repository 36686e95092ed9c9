//! # Event Bus Module
//!
//! Provides a unified event bus for decoupled communication between the
//! viewport engine and its host.
//!
//! ## Overview
//!
//! The event bus enables publish/subscribe patterns across the application:
//! - Publishers emit typed events without knowing subscribers
//! - Subscribers filter and receive events of interest
//! - Supports both sync and async event handling
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cartoframe_core::event_bus::{event_bus, AppEvent, BufferEvent, EventFilter, EventCategory};
//!
//! // Subscribe to buffer events
//! let subscription = event_bus().subscribe(
//!     EventFilter::Categories(vec![EventCategory::Buffer]),
//!     |event| {
//!         if let AppEvent::Buffer(e) = event {
//!             println!("Buffer event: {:?}", e);
//!         }
//!     },
//! );
//!
//! // Publish an event
//! event_bus().publish(AppEvent::Buffer(BufferEvent::ScreenUpdated));
//!
//! // Unsubscribe when done
//! event_bus().unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
