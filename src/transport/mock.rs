//! Scripted transport used by the engine and client tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures::future::BoxFuture;

use crate::error::{Error, Result};
use crate::transport::{ByteFeed, Transport};

type Responder = Box<dyn FnMut(&[u8]) -> Vec<u8> + Send>;

/// Transport that answers every write with bytes chosen by a responder.
pub(crate) struct MockTransport {
    feed: ByteFeed,
    responder: Responder,
    writes: Arc<Mutex<Vec<Bytes>>>,
    opens: Arc<Mutex<usize>>,
    fail_writes: bool,
}

impl MockTransport {
    pub(crate) fn new(
        feed: ByteFeed,
        responder: impl FnMut(&[u8]) -> Vec<u8> + Send + 'static,
    ) -> Self {
        Self {
            feed,
            responder: Box::new(responder),
            writes: Arc::new(Mutex::new(Vec::new())),
            opens: Arc::new(Mutex::new(0)),
            fail_writes: false,
        }
    }

    /// Answers the n-th write with the n-th entry; silent once exhausted.
    pub(crate) fn scripted(feed: ByteFeed, replies: Vec<Vec<u8>>) -> Self {
        let mut replies = VecDeque::from(replies);
        Self::new(feed, move |_| replies.pop_front().unwrap_or_default())
    }

    pub(crate) fn failing(feed: ByteFeed) -> Self {
        let mut transport = Self::new(feed, |_| Vec::new());
        transport.fail_writes = true;
        transport
    }

    /// Shared log of every frame written.
    pub(crate) fn writes(&self) -> Arc<Mutex<Vec<Bytes>>> {
        Arc::clone(&self.writes)
    }

    pub(crate) fn opens(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.opens)
    }
}

impl Transport for MockTransport {
    fn open(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            *self.opens.lock().unwrap() += 1;
            Ok(())
        })
    }

    fn write(&mut self, data: Bytes) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.fail_writes {
                return Err(Error::Transport {
                    message: "write rejected".into(),
                });
            }
            self.writes.lock().unwrap().push(data.clone());
            let reply = (self.responder)(&data);
            let _ = self.feed.extend(&reply);
            Ok(())
        })
    }
}
