use crate::platform::PlatformError;
use thiserror::Error;

/// Errors a handshake step propagates to its caller.
///
/// Callback validation and exchange failures are not errors here; they
/// become a [`HandshakeResponse`](super::HandshakeResponse).
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The permission URL could not be built, usually because the
    /// submitted shop is not a valid shop domain.
    #[error("Failed to build permission URL: {0}")]
    PermissionUrl(#[from] PlatformError),
}

// Verify HandshakeError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HandshakeError>();
};
