//! # Capability contracts for registered components.
//!
//! This module provides the component-related types:
//! - [`Component`] - base contract (`name`, `start`, `stop`, `health`)
//! - [`Service`] / [`Controller`] - the two registration categories
//! - [`UiController`] - controller that owns the foreground loop
//! - [`ComponentKind`] - category tag used in logs and errors
//! - [`mock`] - configurable mocks with call counters

mod component;
mod kind;
pub mod mock;

pub use component::{Component, Controller, Service, UiController};
pub use kind::ComponentKind;
