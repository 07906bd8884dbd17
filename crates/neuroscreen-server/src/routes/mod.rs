//! API routes modules.
//!
//! Organized by endpoint:
//! - `audio` - voice recording classification
//! - `video` - gait video relay to the generative backend
//! - `models` - generative model availability (debug)

pub mod audio;
pub mod models;
pub mod video;
