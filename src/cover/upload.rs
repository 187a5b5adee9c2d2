use std::{
    fmt,
    future::Future,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use image::DynamicImage;
use tokio::{
    task,
    time::{Instant, timeout, timeout_at},
};

use super::{BudgetedEncoder, CoverError, EncodedArtifact, ImageCodec, Quality};

/// Ceilings trialed when nothing else is configured, in kilobytes.
pub const DEFAULT_LADDER: [u32; 3] = [55, 50, 45];

pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a single upload attempt as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted,
    /// The endpoint refused the payload because of its size
    RejectedSize { status: u16 },
    /// The endpoint refused the payload for any other reason (auth, rate limit, server error)
    RejectedOther { status: u16, message: String },
    /// No response was received
    TransportError(String),
}

impl UploadOutcome {
    /// Classify an HTTP response of the image endpoint.
    ///
    /// The endpoint answers oversized payloads with 413 or with a plain 400.
    /// A 400 only counts as a size rejection when its body is empty or talks
    /// about the payload size; a 400 naming anything else (bad id, bad
    /// base64) ends the walk.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            200..=299 => UploadOutcome::Accepted,
            413 => UploadOutcome::RejectedSize { status },
            400 if is_size_complaint(&body) => UploadOutcome::RejectedSize { status },
            _ => UploadOutcome::RejectedOther {
                status,
                message: body,
            },
        }
    }
}

const SIZE_HINTS: [&str; 6] = ["size", "large", "too big", "payload", "exceed", "limit"];

fn is_size_complaint(body: &str) -> bool {
    let body = body.to_ascii_lowercase();
    body.trim().is_empty() || SIZE_HINTS.iter().any(|hint| body.contains(hint))
}

/// PUT-style upload of an encoded cover to a target.
pub trait UploadTransport {
    fn upload(
        &self,
        target_id: &str,
        auth_token: &str,
        jpeg: &[u8],
    ) -> impl Future<Output = UploadOutcome> + Send;
}

/// Non-empty, non-increasing sequence of size ceilings in kilobytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ladder(Vec<u32>);

impl Ladder {
    pub fn new(ceilings: Vec<u32>) -> Result<Self, CoverError> {
        if ceilings.is_empty() {
            return Err(CoverError::InvalidLadder("ladder is empty".to_string()));
        }
        if ceilings.contains(&0) {
            return Err(CoverError::InvalidLadder(
                "ceilings must be greater than zero".to_string(),
            ));
        }
        if ceilings.windows(2).any(|pair| pair[1] > pair[0]) {
            return Err(CoverError::InvalidLadder(format!(
                "ceilings must not increase: {:?}",
                ceilings
            )));
        }
        Ok(Self(ceilings))
    }

    pub fn ceilings(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Ladder {
    fn default() -> Self {
        Self(DEFAULT_LADDER.to_vec())
    }
}

impl FromStr for Ladder {
    type Err = CoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ceilings = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u32>().map_err(|e| {
                    CoverError::InvalidLadder(format!("'{}' is not a ceiling: {}", part, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ladder::new(ceilings)
    }
}

impl fmt::Display for Ladder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub ladder: Ladder,
    /// Upper bound for a single transport call
    pub attempt_timeout: Duration,
    /// Point in time after which no further attempt is started
    pub deadline: Option<Instant>,
}

impl RetryPolicy {
    pub fn new(ladder: Ladder) -> Self {
        Self {
            ladder,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            deadline: None,
        }
    }

    pub fn with_attempt_timeout(mut self, attempt_timeout: Duration) -> Self {
        self.attempt_timeout = attempt_timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Ladder::default())
    }
}

/// Successful upload summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReport {
    pub ceiling_kb: u32,
    pub quality: Quality,
    pub size_bytes: usize,
    pub attempts: usize,
}

/// Walks a [`Ladder`] of ceilings, encoding and uploading until the
/// transport accepts a payload.
///
/// Decoding and encoding run on tokio's blocking pool, so a walk never
/// stalls the async workers and stays cancellable while it encodes.
pub struct TieredUploader<C, T> {
    encoder: Arc<BudgetedEncoder<C>>,
    transport: T,
    policy: RetryPolicy,
}

/// Raises the flag when the owning future is dropped, stopping a detached encode.
#[derive(Default)]
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

impl<C, T> TieredUploader<C, T>
where
    C: ImageCodec + Send + Sync + 'static,
    T: UploadTransport,
{
    pub fn new(encoder: BudgetedEncoder<C>, transport: T, policy: RetryPolicy) -> Self {
        Self {
            encoder: Arc::new(encoder),
            transport,
            policy,
        }
    }

    pub fn encoder(&self) -> &BudgetedEncoder<C> {
        &self.encoder
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Decode source bytes with the uploader's codec on the blocking pool.
    pub async fn decode(&self, bytes: Vec<u8>) -> Result<DynamicImage, CoverError> {
        let encoder = Arc::clone(&self.encoder);
        task::spawn_blocking(move || encoder.codec().decode(&bytes))
            .await
            .map_err(|e| CoverError::Decode(format!("decoder task failed: {}", e)))?
    }

    /// Upload `source` to `target_id`, stepping down the ladder on size rejections.
    ///
    /// Every rung re-encodes the original raster. Non-size rejections and
    /// transport failures end the walk immediately; only size rejections
    /// advance to the next ceiling. A deadline passing while a rung is being
    /// encoded ends the walk with [`CoverError::DeadlineExceeded`].
    pub async fn upload_with_retry(
        &self,
        source: &DynamicImage,
        auth_token: &str,
        target_id: &str,
    ) -> Result<UploadReport, CoverError> {
        let source = Arc::new(source.clone());
        let mut attempts = 0;
        let mut last_status = None;

        for &ceiling_kb in self.policy.ladder.ceilings() {
            self.attempt_timeout(attempts)?;
            let artifact = self.encode_rung(&source, ceiling_kb, attempts).await?;
            let attempt_timeout = self.attempt_timeout(attempts)?;
            attempts += 1;

            let outcome = timeout(
                attempt_timeout,
                self.transport.upload(target_id, auth_token, &artifact.bytes),
            )
            .await
            .map_err(|_| CoverError::AttemptTimedOut {
                ceiling_kb,
                timeout: attempt_timeout,
            })?;

            match outcome {
                UploadOutcome::Accepted => {
                    return Ok(UploadReport {
                        ceiling_kb,
                        quality: artifact.quality,
                        size_bytes: artifact.len(),
                        attempts,
                    });
                }
                UploadOutcome::RejectedSize { status } => last_status = Some(status),
                UploadOutcome::RejectedOther { status, message } => {
                    return Err(CoverError::UploadRejected { status, message });
                }
                UploadOutcome::TransportError(message) => {
                    return Err(CoverError::Transport(message));
                }
            }
        }

        Err(CoverError::LadderExhausted {
            attempts,
            last_status: last_status.unwrap_or_default(),
        })
    }

    async fn encode_rung(
        &self,
        source: &Arc<DynamicImage>,
        ceiling_kb: u32,
        attempts: usize,
    ) -> Result<EncodedArtifact, CoverError> {
        let guard = CancelOnDrop::default();
        let cancelled = Arc::clone(&guard.0);
        let encoder = Arc::clone(&self.encoder);
        let source = Arc::clone(source);

        let handle = task::spawn_blocking(move || {
            encoder.encode_to_budget_until(&source, ceiling_kb, &cancelled)
        });

        let joined = match self.policy.deadline {
            Some(deadline) => timeout_at(deadline, handle)
                .await
                .map_err(|_| CoverError::DeadlineExceeded { attempts })?,
            None => handle.await,
        };

        joined.map_err(|e| CoverError::Encode(format!("encoder task failed: {}", e)))?
    }

    fn attempt_timeout(&self, attempts: usize) -> Result<Duration, CoverError> {
        match self.policy.deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(CoverError::DeadlineExceeded { attempts });
                }
                Ok(remaining.min(self.policy.attempt_timeout))
            }
            None => Ok(self.policy.attempt_timeout),
        }
    }
}
