//! # Cover Module
//!
//! Fits a playlist cover into the upload endpoint's size limit and pushes it.
//!
//! Two pieces do the work:
//!
//! - [`BudgetedEncoder`] re-encodes a decoded raster as JPEG, walking the
//!   quality level down from 95 until the output is at most the requested
//!   number of kilobytes. If quality 1 still does not fit, the caller gets
//!   [`CoverError::BudgetUnreachable`].
//! - [`TieredUploader`] walks a [`Ladder`] of shrinking ceilings (55, 50 and
//!   45 KB by default). Each rung encodes the original raster again and hands
//!   the bytes to an [`UploadTransport`]. The endpoint's real size threshold
//!   is not predictable, so a size rejection moves to the next rung while any
//!   other rejection ends the walk right away.
//!
//! ```text
//! TieredUploader ──► BudgetedEncoder ──► ImageCodec
//!       │
//!       └──────────► UploadTransport ──► accept / reject ──► next rung or stop
//! ```
//!
//! Codec and transport are injected, so the whole pipeline runs in tests
//! without network access or real images.

mod codec;
mod encoder;
mod error;
mod upload;

pub use codec::{ImageCodec, JpegCodec, Quality};
pub use encoder::{BudgetedEncoder, EncodedArtifact};
pub use error::CoverError;
pub use upload::{
    DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_LADDER, Ladder, RetryPolicy, TieredUploader, UploadOutcome,
    UploadReport, UploadTransport,
};
