//! HTML rendering for model replies.
//!
//! - [`generative`]: renders UI trees through a closed component whitelist.
//! - [`sanitize`]: strips unsafe markup from model HTML.
//! - [`transcript`]: lays messages out as a standalone chat page.
//! - [`html`]: the escaped-markup newtype the other modules produce.

pub mod generative;
pub mod html;
pub mod sanitize;
pub mod transcript;
