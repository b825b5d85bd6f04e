//! Local chromedriver management - spawning and readiness checking

use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to a running chromedriver process
pub struct ChromedriverHandle {
    child: Child,
    pub webdriver_url: String,
    pub port: u16,
}

impl ChromedriverHandle {
    /// Spawn `binary` on a free port and wait until it reports ready
    pub async fn spawn(binary: &Path, startup_timeout: Duration) -> E2eResult<Self> {
        let port = find_free_port()?;
        let webdriver_url = format!("http://127.0.0.1:{}", port);

        info!("Spawning chromedriver on port {}", port);

        let child = Command::new(binary)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    E2eError::ChromedriverNotFound(binary.display().to_string())
                }
                _ => E2eError::SessionStartup(format!(
                    "Failed to spawn {}: {}",
                    binary.display(),
                    e
                )),
            })?;

        let handle = ChromedriverHandle {
            child,
            webdriver_url: webdriver_url.clone(),
            port,
        };

        handle.wait_for_ready(startup_timeout).await?;

        info!("chromedriver is ready at {}", webdriver_url);
        Ok(handle)
    }

    /// Poll `/status` until the driver says it can create sessions
    async fn wait_for_ready(&self, timeout_duration: Duration) -> E2eResult<()> {
        let status_url = format!("{}/status", self.webdriver_url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    let body: serde_json::Value = resp.json().await?;
                    if body["value"]["ready"].as_bool().unwrap_or(false) {
                        return Ok(());
                    }
                }
                Ok(resp) => {
                    warn!("chromedriver status returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for chromedriver to start...");
                    }
                    if !e.is_connect() {
                        warn!("chromedriver status error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::DriverHealthCheck(attempts))
    }

    pub fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    /// Stop the process: SIGTERM first, then kill
    pub fn stop(&mut self) -> E2eResult<()> {
        info!("Stopping chromedriver (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(200));
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for ChromedriverHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn find_free_port() -> E2eResult<u16> {
    Ok(TcpListener::bind("127.0.0.1:0")?.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_port_is_unprivileged() {
        assert!(find_free_port().unwrap() > 1024);
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let err = ChromedriverHandle::spawn(
            Path::new("/nonexistent/chromedriver"),
            Duration::from_millis(100),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, E2eError::ChromedriverNotFound(_)));
    }
}
