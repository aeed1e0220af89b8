//! Deferred results for chained remote calls.
//!
//! A [`Pending`] wraps a boxed future that resolves exactly once to either a
//! value or a [`ContractError`]. Continuations run only after their
//! predecessor resolves, and a failure anywhere in a chain skips every later
//! continuation and surfaces unchanged.
//!
//! Nothing here spawns tasks: all work happens on the caller's executor when
//! the final result is awaited, so a single-threaded runtime observes calls in
//! the order they were issued.

use futures::future::{self, BoxFuture, FutureExt, Shared};
use futures::stream::{FuturesOrdered, StreamExt};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::ContractError;

/// A result that becomes available once the underlying remote call completes.
///
/// Await it (`pending.await`) to observe the terminal state.
#[must_use = "a pending result does nothing unless awaited"]
pub struct Pending<T> {
    inner: BoxFuture<'static, Result<T, ContractError>>,
}

impl<T: Send + 'static> Pending<T> {
    /// Wrap any future producing a contract result.
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, ContractError>> + Send + 'static,
    {
        Self { inner: fut.boxed() }
    }

    /// An already-resolved result; no further I/O is needed.
    pub fn from_value(value: T) -> Self {
        Self::new(future::ready(Ok(value)))
    }

    /// An already-failed result.
    pub fn from_error(err: impl Into<ContractError>) -> Self {
        Self::new(future::ready(Err(err.into())))
    }

    pub fn from_result<E: Into<ContractError>>(result: Result<T, E>) -> Self {
        Self::new(future::ready(result.map_err(Into::into)))
    }

    /// Run `f` on the resolved value. If `self` fails, `f` is skipped and the
    /// failure propagates; if `f` fails, the derived result fails.
    pub fn map<U, E, F>(self, f: F) -> Pending<U>
    where
        U: Send + 'static,
        E: Into<ContractError>,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        Pending::new(async move { f(self.await?).map_err(Into::into) })
    }

    /// Chain into another pending result. The derived result resolves only
    /// when the one returned by `f` resolves.
    pub fn flat_map<U, F>(self, f: F) -> Pending<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Pending<U> + Send + 'static,
    {
        Pending::new(async move { f(self.await?).await })
    }

    /// Convert into a handle that many derived results can read from.
    pub fn shared(self) -> SharedPending<T>
    where
        T: Clone + Sync,
    {
        SharedPending {
            inner: self.inner.shared(),
        }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, ContractError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending").finish_non_exhaustive()
    }
}

/// A pending result whose terminal value can be read by any number of
/// derived results. The underlying call runs once.
pub struct SharedPending<T> {
    inner: Shared<BoxFuture<'static, Result<T, ContractError>>>,
}

impl<T: Clone + Send + Sync + 'static> SharedPending<T> {
    /// Derive a new pending result reading the same terminal value.
    pub fn fork(&self) -> Pending<T> {
        Pending::new(self.inner.clone())
    }
}

impl<T> Clone for SharedPending<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// A failure observed while awaiting a batch, tagged with the position of the
/// pending result that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedError {
    pub index: usize,
    pub source: ContractError,
}

impl fmt::Display for IndexedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {}: {}", self.index, self.source)
    }
}

impl std::error::Error for IndexedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Drive every pending result concurrently but observe them strictly in
/// issuance order, folding each value into the accumulator.
///
/// The first failure in issuance order aborts the fold, even if a later item
/// already failed or succeeded. Items still outstanding are dropped without
/// being awaited.
pub async fn try_fold_ordered<T, A, F>(
    pending: Vec<Pending<T>>,
    init: A,
    mut f: F,
) -> Result<A, IndexedError>
where
    F: FnMut(A, T) -> A,
{
    let mut ordered: FuturesOrdered<Pending<T>> = pending.into_iter().collect();
    let mut acc = init;
    let mut index = 0usize;
    while let Some(result) = ordered.next().await {
        match result {
            Ok(value) => acc = f(acc, value),
            Err(source) => return Err(IndexedError { index, source }),
        }
        index += 1;
    }
    Ok(acc)
}

/// Await every pending result in issuance order, collecting the values.
pub async fn try_join_ordered<T>(pending: Vec<Pending<T>>) -> Result<Vec<T>, IndexedError> {
    let capacity = pending.len();
    try_fold_ordered(pending, Vec::with_capacity(capacity), |mut acc, v| {
        acc.push(v);
        acc
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, TransportError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn from_value_resolves_immediately() {
        assert_eq!(Pending::from_value(7u64).await, Ok(7));
    }

    #[tokio::test]
    async fn map_skips_continuation_on_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let p: Pending<u64> = Pending::from_error(ContractError::MissingHeader);
        let derived = p.map(move |v| {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ContractError>(v + 1)
        });
        assert_eq!(derived.await, Err(ContractError::MissingHeader));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failing_continuation_fails_derived_result() {
        let derived = Pending::from_value(1u8)
            .map(|_| Err::<u8, _>(DecodeError::shape("uint256", "string")));
        assert!(matches!(
            derived.await,
            Err(ContractError::Decode(DecodeError::ShapeMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn flat_map_waits_for_inner_result() {
        let chained = Pending::from_value(41u64)
            .flat_map(|n| Pending::new(async move { Ok(n + 1) }))
            .map(|n| Ok::<_, ContractError>(n * 2));
        assert_eq!(chained.await, Ok(84));
    }

    #[tokio::test]
    async fn shared_runs_underlying_call_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let shared = Pending::new(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("value".to_string())
        })
        .shared();

        let a = shared.fork().map(|s| Ok::<_, ContractError>(s.len()));
        let b = shared.fork();
        assert_eq!(a.await, Ok(5));
        assert_eq!(b.await, Ok("value".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fold_reports_first_failure_in_issuance_order() {
        let pending = vec![
            Pending::from_value(1u64),
            Pending::from_error(TransportError::Other("chain b down".into())),
            Pending::from_error(TransportError::Other("chain c down".into())),
        ];
        let err = try_fold_ordered(pending, 0u64, |acc, v| acc + v)
            .await
            .unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(
            err.source,
            ContractError::Transport(TransportError::Other("chain b down".into()))
        );
    }

    #[tokio::test]
    async fn join_preserves_order() {
        let pending = vec![
            Pending::new(async {
                tokio::task::yield_now().await;
                Ok(1u8)
            }),
            Pending::from_value(2u8),
        ];
        assert_eq!(try_join_ordered(pending).await, Ok(vec![1, 2]));
    }
}
