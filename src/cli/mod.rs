//! # CLI Module
//!
//! User-facing commands of sporlcover.
//!
//! ## Commands
//!
//! - [`auth`] - OAuth 2.0 PKCE flow granting `ugc-image-upload`; the token is
//!   cached for [`upload`]
//! - [`playlists`] - Lists a user's playlists (application token)
//! - [`tracks`] - Lists the tracks of a playlist (application token)
//! - [`generate`] - Generates a cover from a playlist's tracks and optionally
//!   uploads it right away
//! - [`upload`] - Fits an image into the ceiling ladder and sets it as cover
//! - [`serve`] - Runs the HTTP backend
//!
//! ## Usage Patterns
//!
//! ```bash
//! sporlcover auth
//! sporlcover playlists someuser
//! sporlcover generate 37i9dQZF1DXcBWIGoYBM5M --method titles-artists --mood dreamy --upload
//! sporlcover upload 37i9dQZF1DXcBWIGoYBM5M --file cover.png --ladder 60,55,50,45
//! sporlcover serve
//! ```
//!
//! Fatal problems end the process through the `error!` macro; everything
//! else is reported with `info!`, `success!` and `warning!`.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

mod auth;
mod generate;
mod playlists;
mod serve;
mod tracks;
mod upload;

pub use auth::auth;
pub use generate::{GenerateArgs, generate};
pub use playlists::playlists;
pub use serve::serve;
pub use tracks::tracks;
pub use upload::{ImageSource, UploadArgs, upload};

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
