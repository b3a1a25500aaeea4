//! Poll-until-ready waits for creation operations

use crate::error::{ApiResult, ProvisionError};
use crate::operation::Operation;
use crate::provider::ComputeApi;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};
use vpcflow_config::ReadinessConfig;

/// Polls an operation until it is done, bounded by a timeout
#[derive(Debug, Clone)]
pub struct ReadinessWaiter {
    timeout: Duration,
    poll_interval: Duration,
    settle: Duration,
}

impl ReadinessWaiter {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
            settle: Duration::ZERO,
        }
    }

    pub fn from_config(config: &ReadinessConfig) -> Self {
        Self::new(config.timeout(), config.poll_interval()).with_settle(config.settle())
    }

    /// Extra delay once the operation reports done
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait until `operation` is done and succeeded
    ///
    /// Fails with `OperationFailed` when the operation finished with an error
    /// and with `ReadinessTimeout` when it is still running after the timeout.
    pub async fn wait(
        &self,
        api: &dyn ComputeApi,
        resource: &str,
        operation: Operation,
    ) -> ApiResult<Operation> {
        info!(resource, operation = %operation.name, "Waiting for resource to become ready");

        let start = Instant::now();
        let mut current = operation;

        loop {
            if current.is_done() {
                if let Some(message) = current.error_message() {
                    return Err(ProvisionError::OperationFailed {
                        operation: current.name,
                        message,
                    });
                }

                if !self.settle.is_zero() {
                    debug!(resource, settle_ms = self.settle.as_millis() as u64, "Settling");
                    sleep(self.settle).await;
                }

                info!(
                    resource,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Resource is ready"
                );
                return Ok(current);
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                return Err(ProvisionError::ReadinessTimeout {
                    resource: resource.to_string(),
                    timeout: self.timeout,
                });
            }

            sleep(self.poll_interval.min(self.timeout - elapsed)).await;
            current = api.get_operation(&current).await?;

            debug!(
                resource,
                operation = %current.name,
                status = %current.status,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Polling operation status"
            );
        }
    }
}

impl Default for ReadinessWaiter {
    fn default() -> Self {
        Self::from_config(&ReadinessConfig::default())
    }
}
