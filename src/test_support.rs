//! Test doubles shared by the unit tests

use crate::backend::{MemoryStorage, StorageArea};
use crate::error::{HostError, StorageError};
use crate::resolver::{Navigator, RedirectRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Memory storage that counts calls and can be told to fail.
#[derive(Default)]
pub(crate) struct CountingStorage {
    inner: MemoryStorage,
    pub(crate) gets: Cell<usize>,
    pub(crate) sets: Cell<usize>,
    pub(crate) removes: Cell<usize>,
    failure: RefCell<Option<String>>,
    yield_between_calls: bool,
}

impl CountingStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Suspends once before every call, so concurrent callers interleave.
    pub(crate) fn yielding() -> Self {
        Self {
            yield_between_calls: true,
            ..Self::default()
        }
    }

    pub(crate) fn fail_with(&self, message: &str) {
        *self.failure.borrow_mut() = Some(message.to_string());
    }

    pub(crate) fn calls(&self) -> usize {
        self.gets.get() + self.sets.get() + self.removes.get()
    }

    async fn before_call(&self, counter: &Cell<usize>) -> Result<(), StorageError> {
        counter.set(counter.get() + 1);
        if self.yield_between_calls {
            YieldNow::default().await;
        }
        match self.failure.borrow().as_ref() {
            Some(message) => Err(StorageError(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl StorageArea for CountingStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        self.before_call(&self.gets).await?;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.before_call(&self.sets).await?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.before_call(&self.removes).await?;
        self.inner.remove(key).await
    }
}

/// Returns `Pending` once, waking itself immediately.
#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

/// Navigator that records every redirect it is asked to perform.
pub(crate) struct RecordingNavigator {
    pub(crate) redirects: RefCell<Vec<RedirectRequest>>,
    fail: bool,
}

impl RecordingNavigator {
    pub(crate) fn new() -> Self {
        Self {
            redirects: RefCell::new(Vec::new()),
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

#[async_trait(?Send)]
impl Navigator for RecordingNavigator {
    async fn redirect(&self, request: &RedirectRequest) -> Result<(), HostError> {
        if self.fail {
            return Err(HostError("tab is gone".to_string()));
        }
        self.redirects.borrow_mut().push(request.clone());
        Ok(())
    }

    fn extension_url(&self, path: &str) -> String {
        format!("chrome-extension://golinks-test/{path}")
    }
}
