//! Check that the application answers before a browser is opened

use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Poll `base_url` until it returns a success or redirect status
pub async fn wait_for_app(base_url: &str, timeout_duration: Duration) -> E2eResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = std::time::Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(base_url).send().await {
            Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
                info!("Application is up at {}", base_url);
                return Ok(());
            }
            Ok(resp) => {
                warn!("Application returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for application at {}...", base_url);
                }
                if !e.is_connect() {
                    warn!("Preflight error: {}", e);
                }
            }
        }

        if start.elapsed() >= timeout_duration {
            return Err(E2eError::AppUnreachable {
                url: base_url.to_string(),
                attempts,
            });
        }
        sleep(Duration::from_millis(250)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[tokio::test]
    async fn unreachable_app_reports_attempts() {
        // Bind then drop so nothing listens on the port
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!("http://127.0.0.1:{}", port);

        let err = wait_for_app(&url, Duration::from_millis(300)).await.unwrap_err();
        match err {
            E2eError::AppUnreachable { url: u, attempts } => {
                assert_eq!(u, url);
                assert!(attempts >= 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
