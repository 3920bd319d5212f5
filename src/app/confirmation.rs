use crate::utils::error::GatewayError;
use reqwest::Client;
use tokio::task::JoinHandle;

/// Visits the SNS confirmation URL on a detached task.
///
/// The handle is returned for tests; the ingress drops it without joining.
/// Failures are logged and never reach the caller.
pub fn spawn_confirmation(client: Client, url: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(url = %url, "Confirming subscription");

        let outcome = match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(url = %url, status = %response.status(), "Subscription confirmed");
                return;
            }
            Ok(response) => GatewayError::ConfirmationFetchError {
                url,
                message: format!("unexpected status {}", response.status()),
            },
            Err(e) => GatewayError::ConfirmationFetchError {
                url,
                message: e.to_string(),
            },
        };

        tracing::error!(error = %outcome, kind = outcome.kind(), "Error confirming subscription");
    })
}
