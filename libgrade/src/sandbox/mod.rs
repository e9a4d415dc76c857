//! Running submissions in isolation.
//!
//! A [`Sandbox`] calls a submission's entry function with decoded arguments
//! and returns its value. Every failure mode is an [`ExecutionError`], so a
//! caller can record it against one testcase and carry on.

mod node;

pub use node::NodeSandbox;

use crate::error::ExecutionError;
use crate::types::Submission;
use crate::value::Value;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Call the submission's entry function with `args`, giving up after
    /// `timeout` of wall-clock time.
    async fn run(
        &self,
        submission: &Submission,
        args: &[Value],
        timeout: Duration,
    ) -> Result<Value, ExecutionError>;
}
