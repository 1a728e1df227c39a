//! Remote Transfer Abstractions
//!
//! Provides the seam between the sync core and whatever mechanism actually
//! moves bytes to the remote host (OpenSSH, rsync daemon, a mounted share).

use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Remote copy capability consumed by the sync driver
///
/// Both operations are blocking from the driver's perspective: they return
/// only once the remote side has confirmed the operation or it has failed.
/// Retry and timeout policy belong to the implementation, not to the driver.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::remote::RemoteTransport;
///
/// async fn push(transport: &dyn RemoteTransport, unit: &std::path::Path) -> Result<()> {
///     transport.ensure_directory("/volume1/archive/Alice/Set 1").await?;
///     transport.transfer(unit, "/volume1/archive/Alice/Set 1").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Create the remote directory (and any missing parents) if it does not
    /// already exist
    ///
    /// Must be idempotent: ensuring a directory that already exists is a
    /// success.
    async fn ensure_directory(&self, remote_dir: &str) -> Result<()>;

    /// Recursively copy a local directory into the remote directory,
    /// preserving relative structure
    ///
    /// `remote_dir` must already exist (see [`ensure_directory`]).
    ///
    /// [`ensure_directory`]: RemoteTransport::ensure_directory
    async fn transfer(&self, local_path: &Path, remote_dir: &str) -> Result<()>;
}
