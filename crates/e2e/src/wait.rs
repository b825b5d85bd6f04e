//! Explicit waits
//!
//! A wait polls one condition until it holds or the configured ceiling
//! elapses. `until_*` raise [`E2eError::Timeout`] on expiry; `probe_*` report
//! a [`Probe`] instead so call sites can branch on absence explicitly.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::WaitConfig;
use crate::driver::{Driver, ElementHandle};
use crate::error::{E2eError, E2eResult};
use crate::locator::Locator;

/// Element state a wait can require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The element exists in the document
    Present,
    /// The element exists, is displayed and is enabled
    Clickable,
}

impl Condition {
    fn describe(&self, locator: &Locator) -> String {
        match self {
            Condition::Present => format!("present {}", locator),
            Condition::Clickable => format!("clickable {}", locator),
        }
    }
}

/// Outcome of a non-raising wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T = ElementHandle> {
    Found(T),
    /// Nothing ever matched the locator
    NotFound(String),
    /// Something matched but never reached the required state
    TimedOut(String),
}

impl<T> Probe<T> {
    pub fn into_found(self) -> Option<T> {
        match self {
            Probe::Found(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Probe::Found(_))
    }

    /// Why nothing was found, for skip lines
    pub fn reason(&self) -> Option<&str> {
        match self {
            Probe::Found(_) => None,
            Probe::NotFound(r) | Probe::TimedOut(r) => Some(r),
        }
    }
}

enum Check<T> {
    Ready(T),
    Missing,
    NotReady,
}

/// Bounded waits against one driver
pub struct Waiter<'a> {
    driver: &'a dyn Driver,
    policy: WaitConfig,
}

impl<'a> Waiter<'a> {
    pub fn new(driver: &'a dyn Driver, policy: WaitConfig) -> Self {
        Self { driver, policy }
    }

    pub fn timeout(&self) -> Duration {
        self.policy.timeout
    }

    /// Same driver, different ceiling
    pub fn with_timeout(&self, timeout: Duration) -> Waiter<'a> {
        Waiter {
            driver: self.driver,
            policy: WaitConfig {
                timeout,
                poll_interval: self.policy.poll_interval.min(timeout),
            },
        }
    }

    pub async fn until_present(&self, locator: &Locator) -> E2eResult<ElementHandle> {
        self.until(locator, Condition::Present).await
    }

    pub async fn until_clickable(&self, locator: &Locator) -> E2eResult<ElementHandle> {
        self.until(locator, Condition::Clickable).await
    }

    pub async fn probe_present(&self, locator: &Locator) -> E2eResult<Probe> {
        self.probe(locator, Condition::Present).await
    }

    pub async fn probe_clickable(&self, locator: &Locator) -> E2eResult<Probe> {
        self.probe(locator, Condition::Clickable).await
    }

    pub async fn until(&self, locator: &Locator, condition: Condition) -> E2eResult<ElementHandle> {
        match self.probe(locator, condition).await? {
            Probe::Found(el) => Ok(el),
            Probe::NotFound(what) | Probe::TimedOut(what) => Err(E2eError::Timeout {
                what,
                after: self.policy.timeout,
            }),
        }
    }

    pub async fn probe(&self, locator: &Locator, condition: Condition) -> E2eResult<Probe> {
        let what = condition.describe(locator);
        debug!("waiting for {}", what);
        self.poll(what, move || self.check(locator, condition)).await
    }

    /// Wait until at least one element matches, then return every match
    pub async fn probe_all_present(&self, locator: &Locator) -> E2eResult<Probe<Vec<ElementHandle>>> {
        let what = format!("all present {}", locator);
        self.poll(what, move || async move {
            let found = self.driver.find_all(locator).await?;
            Ok(if found.is_empty() {
                Check::Missing
            } else {
                Check::Ready(found)
            })
        })
        .await
    }

    /// Wait until the current URL contains `fragment`, ignoring case
    pub async fn until_url_contains(&self, fragment: &str) -> E2eResult<String> {
        let what = format!("url containing '{}'", fragment);
        let needle = fragment.to_lowercase();
        let needle = needle.as_str();
        let probe = self
            .poll(what.clone(), move || async move {
                let url = self.driver.current_url().await?;
                Ok(if url.to_lowercase().contains(needle) {
                    Check::Ready(url)
                } else {
                    Check::NotReady
                })
            })
            .await?;
        match probe {
            Probe::Found(url) => Ok(url),
            _ => Err(E2eError::Timeout {
                what,
                after: self.policy.timeout,
            }),
        }
    }

    /// Wait until nothing matches `locator` any more
    pub async fn until_absent(&self, locator: &Locator) -> E2eResult<()> {
        let what = format!("absent {}", locator);
        let probe = self
            .poll(what.clone(), move || async move {
                Ok(if self.driver.find_all(locator).await?.is_empty() {
                    Check::Ready(())
                } else {
                    Check::NotReady
                })
            })
            .await?;
        match probe {
            Probe::Found(()) => Ok(()),
            _ => Err(E2eError::Timeout {
                what,
                after: self.policy.timeout,
            }),
        }
    }

    async fn check(&self, locator: &Locator, condition: Condition) -> E2eResult<Check<ElementHandle>> {
        let found = self.driver.find_all(locator).await?;
        let Some(first) = found.into_iter().next() else {
            return Ok(Check::Missing);
        };
        if condition == Condition::Present {
            return Ok(Check::Ready(first));
        }
        // A re-render between find and inspect invalidates the handle;
        // that is "not yet", not a failure.
        let ready = match self.is_clickable(&first).await {
            Ok(ready) => ready,
            Err(E2eError::StaleElement(_)) => false,
            Err(e) => return Err(e),
        };
        Ok(if ready { Check::Ready(first) } else { Check::NotReady })
    }

    async fn is_clickable(&self, element: &ElementHandle) -> E2eResult<bool> {
        Ok(self.driver.is_displayed(element).await? && self.driver.is_enabled(element).await?)
    }

    async fn poll<T, F, Fut>(&self, what: String, mut check: F) -> E2eResult<Probe<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<Check<T>>>,
    {
        let deadline = Instant::now() + self.policy.timeout;
        let mut ever_matched = false;

        loop {
            match check().await? {
                Check::Ready(value) => return Ok(Probe::Found(value)),
                Check::NotReady => ever_matched = true,
                Check::Missing => {}
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            sleep(self.policy.poll_interval.min(deadline - now)).await;
        }

        debug!("gave up on {} after {:?}", what, self.policy.timeout);
        Ok(if ever_matched {
            Probe::TimedOut(what)
        } else {
            Probe::NotFound(what)
        })
    }
}
