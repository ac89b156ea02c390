//! Modal overlays awaitable as a single result.
//!
//! The pieces, leaf first:
//!
//! - [`promise`] - single-fire deferred values that can chain onto each other
//! - [`button`] - the ordered button set and its validation rule
//! - [`input`] / [`form`] - input definitions and the collector that owns them
//! - [`document`] - the active modal stack deciding which node is interactive
//! - [`lifecycle`] - showing, waiting, validating and removing an overlay
//! - [`dialogs`] - `alert`, `confirm`, `prompt` and `loading` built on `wait`

pub mod button;
pub mod dialogs;
pub mod document;
pub mod error;
pub mod form;
pub mod input;
pub mod lifecycle;
pub mod promise;

#[cfg(test)]
pub(crate) mod testing;

pub use button::{Button, ButtonLayout, ButtonRegistry, ValidationRule};
pub use document::{Document, NodeId, NodeInfo};
pub use error::{OverlayError, Result};
pub use form::Form;
pub use input::{Input, InputCollector, InputKind, InputValue, SelectOption, ValidateValue, Value};
pub use lifecycle::{Overlay, OverlayEvent, OverlayResult, OverlayState, WaitOptions};
pub use promise::{Deferred, ResultPromise, deferred};
