// src/fetch/retry.rs
use std::{thread, time::Duration};
use tracing::{error, warn};
use url::Url;

use super::{FetchError, Page, PageSource};

/// Retries transient transport failures and 5xx/429 replies with exponential backoff.
/// With `max_retries == 0` every call is a single pass-through attempt.
#[derive(Debug, Clone)]
pub struct Retrying<S> {
    inner: S,
    max_retries: u32,
    initial_backoff: Duration,
}

impl<S> Retrying<S> {
    pub fn new(inner: S, max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            initial_backoff,
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

fn retryable(result: &Result<Page, FetchError>) -> bool {
    match result {
        Ok(page) => page.status == 429 || (500..600).contains(&page.status),
        Err(e) => e.is_transient(),
    }
}

impl<S: PageSource> PageSource for Retrying<S> {
    fn fetch(&self, url: &Url) -> Result<Page, FetchError> {
        let mut attempts = 0;
        loop {
            let result = self.inner.fetch(url);
            if !retryable(&result) {
                return result;
            }
            if attempts >= self.max_retries {
                if self.max_retries > 0 {
                    error!(%url, attempts, "Exhausted retries");
                }
                return result;
            }
            attempts += 1;
            let delay = self.backoff(attempts);
            let delay_ms = delay.as_millis() as u64;
            match &result {
                Ok(page) => warn!(%url, attempt = attempts, delay_ms, status = page.status, "Retrying"),
                Err(e) => warn!(%url, attempt = attempts, delay_ms, error = %e, "Retrying"),
            }
            thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, collections::VecDeque};

    struct Scripted {
        replies: RefCell<VecDeque<Result<Page, FetchError>>>,
        calls: RefCell<u32>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<Page, FetchError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                calls: RefCell::new(0),
            }
        }
    }

    impl PageSource for Scripted {
        fn fetch(&self, _url: &Url) -> Result<Page, FetchError> {
            *self.calls.borrow_mut() += 1;
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Request("script exhausted".into())))
        }
    }

    fn url() -> Url {
        Url::parse("https://example.test/classic/spell=1").unwrap()
    }

    #[test]
    fn zero_retries_is_a_single_attempt() {
        let src = Retrying::new(
            Scripted::new(vec![Err(FetchError::Timeout("slow".into()))]),
            0,
            Duration::ZERO,
        );
        assert_eq!(src.fetch(&url()), Err(FetchError::Timeout("slow".into())));
        assert_eq!(*src.inner.calls.borrow(), 1);
    }

    #[test]
    fn transient_failures_are_retried() {
        let src = Retrying::new(
            Scripted::new(vec![
                Err(FetchError::Connect("reset".into())),
                Ok(Page::new(503, "")),
                Ok(Page::new(200, "<title>x</title>")),
            ]),
            3,
            Duration::ZERO,
        );
        assert_eq!(src.fetch(&url()), Ok(Page::new(200, "<title>x</title>")));
        assert_eq!(*src.inner.calls.borrow(), 3);
    }

    #[test]
    fn not_found_and_body_errors_are_final() {
        let src = Retrying::new(
            Scripted::new(vec![Ok(Page::new(404, "")), Err(FetchError::Body("eof".into()))]),
            5,
            Duration::ZERO,
        );
        assert_eq!(src.fetch(&url()), Ok(Page::new(404, "")));
        assert_eq!(src.fetch(&url()), Err(FetchError::Body("eof".into())));
        assert_eq!(*src.inner.calls.borrow(), 2);
    }

    #[test]
    fn retries_stop_at_limit() {
        let src = Retrying::new(
            Scripted::new(vec![Ok(Page::new(500, "")); 4]),
            2,
            Duration::ZERO,
        );
        assert_eq!(src.fetch(&url()), Ok(Page::new(500, "")));
        assert_eq!(*src.inner.calls.borrow(), 3);
    }

    #[test]
    fn backoff_doubles() {
        let src = Retrying::new(Scripted::new(vec![]), 3, Duration::from_millis(100));
        assert_eq!(src.backoff(1), Duration::from_millis(100));
        assert_eq!(src.backoff(3), Duration::from_millis(400));
    }
}
