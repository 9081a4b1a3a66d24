// Feedback core: score extraction, normalization of raw AI feedback into the
// canonical record, and the per-panel view groupings.
// Everything here is pure and synchronous; no I/O, no shared state.

pub mod model;
pub mod normalize;
pub mod present;
pub mod raw;
pub mod score;

pub use model::NormalizedFeedback;
pub use normalize::normalize;
pub use present::{review_views, ReviewViews};
