use crate::{utils::PinBoxFut, JsonRpcClient, Provider};
use futures_core::stream::Stream;
use futures_util::StreamExt;
use hypersdk_core::types::LastAccepted;
use pin_project::pin_project;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};
use tracing::debug;

pub use crate::utils::interval;

/// The default polling interval for the block watcher and balance polling
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

enum BlockWatcherState<'a> {
    WaitForInterval,
    GetLastAccepted(PinBoxFut<'a, LastAccepted>),
}

#[must_use = "watchers do nothing unless you stream them"]
/// Streams newly accepted blocks by polling `hypersdk.lastAccepted`
///
/// Each height is yielded once. Failed polls are logged and skipped, the stream itself never
/// ends.
#[pin_project]
pub struct BlockWatcher<'a, P> {
    pub(crate) provider: &'a Provider<P>,

    // The polling interval
    interval: Box<dyn Stream<Item = ()> + Send + Unpin>,
    last_height: Option<u64>,
    /// statemachine driven by the Stream impl
    state: BlockWatcherState<'a>,
}

impl<'a, P: JsonRpcClient> BlockWatcher<'a, P> {
    /// Creates a new watcher polling at the default interval
    pub fn new(provider: &'a Provider<P>) -> Self {
        Self {
            provider,
            interval: Box::new(interval(DEFAULT_POLL_INTERVAL)),
            last_height: None,
            state: BlockWatcherState::WaitForInterval,
        }
    }

    /// Sets the stream's polling interval
    pub fn interval(mut self, duration: Duration) -> Self {
        self.interval = Box::new(interval(duration));
        self
    }

    /// Alias for Box::pin, must be called in order to pin the stream and be able
    /// to call `next` on it.
    pub fn stream(self) -> Pin<Box<Self>> {
        Box::pin(self)
    }
}

// Advances the watcher's state machine
impl<'a, P: JsonRpcClient> Stream for BlockWatcher<'a, P> {
    type Item = LastAccepted;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        loop {
            match this.state {
                BlockWatcherState::WaitForInterval => {
                    // Wait the polling period
                    let _ready = futures_util::ready!(this.interval.poll_next_unpin(cx));
                    let provider: &'a Provider<P> = *this.provider;
                    *this.state = BlockWatcherState::GetLastAccepted(Box::pin(provider.last_accepted()));
                }
                BlockWatcherState::GetLastAccepted(fut) => {
                    let res = futures_util::ready!(fut.as_mut().poll(cx));
                    *this.state = BlockWatcherState::WaitForInterval;
                    match res {
                        Ok(block) if this.last_height.map_or(true, |h| block.height > h) => {
                            *this.last_height = Some(block.height);
                            return Poll::Ready(Some(block))
                        }
                        Ok(_) => {}
                        Err(err) => debug!(%err, "failed to poll the last accepted block"),
                    }
                }
            }
        }
    }
}
