//! Multicast fan-out of the extracted entity stream.
//!
//! A [`Publisher`] is created for a fixed number of subscribers. Items can
//! only be emitted through a [`Connection`], and [`Publisher::connect`] does
//! not hand one out until every subscriber has registered. Each subscriber
//! owns an unbounded queue, so a slow pipeline never blocks the pump or its
//! sibling, and every item reaches every subscriber once, in emission order.

use crate::utils::error::{HarvestError, Result};
use std::sync::Mutex;
use tokio::sync::{mpsc, watch};

/// What a subscriber sees on its queue.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification<T> {
    Next(T),
    /// 上游致命錯誤，之後不會再有資料
    Error(String),
}

pub struct Subscription<T> {
    receiver: mpsc::UnboundedReceiver<Notification<T>>,
}

impl<T> Subscription<T> {
    /// `None` once the publisher completed and the queue is drained.
    pub async fn recv(&mut self) -> Option<Notification<T>> {
        self.receiver.recv().await
    }
}

pub struct Publisher<T> {
    expected: usize,
    senders: Mutex<Vec<mpsc::UnboundedSender<Notification<T>>>>,
    subscribed: watch::Sender<usize>,
}

impl<T: Clone> Publisher<T> {
    pub fn new(expected: usize) -> Self {
        let (subscribed, _) = watch::channel(0);
        Self {
            expected,
            senders: Mutex::new(Vec::with_capacity(expected)),
            subscribed,
        }
    }

    pub fn expected_subscribers(&self) -> usize {
        self.expected
    }

    pub fn subscribe(&self) -> Result<Subscription<T>> {
        let mut senders = self.senders.lock().map_err(|_| HarvestError::Subscription {
            message: "subscriber registry poisoned".to_string(),
        })?;

        if senders.len() >= self.expected {
            return Err(HarvestError::Subscription {
                message: format!("publisher accepts only {} subscribers", self.expected),
            });
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        senders.push(sender);
        self.subscribed.send_replace(senders.len());

        Ok(Subscription { receiver })
    }

    /// Waits until all expected subscribers are registered and returns the
    /// handle used to emit items.
    pub async fn connect(&self) -> Result<Connection<T>> {
        let mut subscribed = self.subscribed.subscribe();
        subscribed
            .wait_for(|count| *count >= self.expected)
            .await
            .map_err(|_| HarvestError::Subscription {
                message: "publisher dropped while waiting for subscribers".to_string(),
            })?;

        let mut senders = self.senders.lock().map_err(|_| HarvestError::Subscription {
            message: "subscriber registry poisoned".to_string(),
        })?;

        tracing::debug!("📡 publisher connected with {} subscribers", senders.len());

        Ok(Connection {
            senders: std::mem::take(&mut *senders),
            published: 0,
        })
    }
}

pub struct Connection<T> {
    senders: Vec<mpsc::UnboundedSender<Notification<T>>>,
    published: usize,
}

impl<T: Clone> Connection<T> {
    /// Delivers one item to every subscriber. A subscriber that already went
    /// away is ignored; the others still receive the item.
    pub fn publish(&mut self, item: T) {
        if let Some((last, rest)) = self.senders.split_last() {
            for sender in rest {
                let _ = sender.send(Notification::Next(item.clone()));
            }
            let _ = last.send(Notification::Next(item));
        }
        self.published += 1;
    }

    pub fn published(&self) -> usize {
        self.published
    }

    /// Closes every queue; subscribers drain what is left, then see the end.
    pub fn complete(self) -> usize {
        self.published
    }

    pub fn fail(self, message: impl Into<String>) -> usize {
        let message = message.into();
        for sender in &self.senders {
            let _ = sender.send(Notification::Error(message.clone()));
        }
        self.published
    }
}
