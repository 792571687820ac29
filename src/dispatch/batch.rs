use crate::dispatch::CommandRequest;
use crate::dispatch::shell::ShellDispatch;
use crate::result::RawExecutionResult;

/// Upper bound on commands accepted in one batch.
pub const MAX_BATCH_COMMANDS: usize = 50;

impl ShellDispatch {
    /// Run commands one after another in order.
    ///
    /// With `stop_on_failure` the first unsuccessful result (non-zero exit,
    /// timeout, launch failure) ends the batch; it is included in the output
    /// and the remaining commands never run.
    pub async fn execute_batch(
        &self,
        requests: &[CommandRequest],
        stop_on_failure: bool,
    ) -> Vec<RawExecutionResult> {
        let mut results = Vec::with_capacity(requests.len());
        for (index, req) in requests.iter().enumerate() {
            let raw = self.execute(req).await;
            let failed = !raw.success();
            results.push(raw);

            if failed && stop_on_failure {
                let skipped = requests.len() - index - 1;
                if skipped > 0 {
                    tracing::info!(index, skipped, "batch stopped after failed command");
                }
                break;
            }
        }
        results
    }
}
