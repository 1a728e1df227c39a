//! OpenSSH-backed implementation of `RemoteTransport`
//!
//! Shells out to the `ssh` and `scp` binaries: directory creation runs
//! `ssh <host> mkdir -p '<dir>'`, transfer runs `scp -r -q <local>
//! <host>:'<dir>/'`. Both block until the child exits; authentication, host
//! aliases and retry behavior all live in the operator's ssh configuration,
//! not here.

use std::ffi::OsString;
use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::remote::RemoteTransport;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SshError};

/// Remote transport over the OpenSSH client tools
pub struct SshTransport {
    host: String,
    ssh_program: String,
    scp_program: String,
    extra_args: Vec<String>,
}

impl SshTransport {
    /// Create a transport for a host (a name from ssh config or `user@host`)
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ssh_program: "ssh".to_string(),
            scp_program: "scp".to_string(),
            extra_args: Vec::new(),
        }
    }

    /// Pass extra arguments (e.g. `-o ConnectTimeout=10`) to both tools
    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args.extend(args);
        self
    }

    /// Override the ssh and scp binaries, mainly for testing
    pub fn with_programs(mut self, ssh: impl Into<String>, scp: impl Into<String>) -> Self {
        self.ssh_program = ssh.into();
        self.scp_program = scp.into();
        self
    }

    fn mkdir_args(&self, remote_dir: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(Into::into).collect();
        args.push(self.host.clone().into());
        args.push(format!("mkdir -p {}", shell_quote(remote_dir)).into());
        args
    }

    fn scp_args(&self, local_path: &Path, remote_dir: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-r".into(), "-q".into()];
        args.extend(self.extra_args.iter().map(OsString::from));
        args.push(local_path.into());
        args.push(format!("{}:{}", self.host, shell_quote(&format!("{remote_dir}/"))).into());
        args
    }

    async fn run(&self, program: &str, args: Vec<OsString>) -> Result<()> {
        debug!(program, ?args, "Running transport command");

        let output: Output = Command::new(program)
            .args(&args)
            .output()
            .await
            .map_err(|source| SshError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(SshError::CommandFailed {
                program: program.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl RemoteTransport for SshTransport {
    async fn ensure_directory(&self, remote_dir: &str) -> BridgeResult<()> {
        let args = self.mkdir_args(remote_dir);
        self.run(&self.ssh_program, args).await.map_err(Into::into)
    }

    async fn transfer(&self, local_path: &Path, remote_dir: &str) -> BridgeResult<()> {
        let args = self.scp_args(local_path, remote_dir);
        self.run(&self.scp_program, args).await.map_err(Into::into)
    }
}

/// Single-quote a string for the remote shell
///
/// Remote paths pass through the remote login shell for both ssh and scp, so
/// names with spaces or quotes must be protected.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
