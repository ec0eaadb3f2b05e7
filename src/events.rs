//! Named publish/subscribe channels for application notifications.
//!
//! Delivery is synchronous: `publish` runs every subscriber of the channel
//! to completion, in subscription order, before returning.

use crate::errors::ChartError;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Channel carrying revised values for a single day.
pub const NUTRITION_UPDATED: &str = "nutrition:updated";

pub trait Subscriber<T>: Send {
    fn notify(&mut self, detail: Option<&T>) -> Result<(), ChartError>;
}

impl<T, F> Subscriber<T> for F
where
    F: FnMut(Option<&T>) -> Result<(), ChartError> + Send,
{
    fn notify(&mut self, detail: Option<&T>) -> Result<(), ChartError> {
        self(detail)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription<T> {
    id: SubscriptionId,
    subscriber: Box<dyn Subscriber<T>>,
}

pub struct EventBus<T> {
    channels: HashMap<String, Vec<Subscription<T>>>,
    next_id: u64,
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self {
            channels: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<T> EventBus<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<S>(&mut self, channel: impl Into<String>, subscriber: S) -> SubscriptionId
    where
        S: Subscriber<T> + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let channel = channel.into();
        debug!(%channel, id = id.0, "subscribed");
        self.channels.entry(channel).or_default().push(Subscription {
            id,
            subscriber: Box::new(subscriber),
        });
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for subscriptions in self.channels.values_mut() {
            if let Some(position) = subscriptions.iter().position(|s| s.id == id) {
                subscriptions.remove(position);
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels.get(channel).map_or(0, Vec::len)
    }

    /// Delivers `detail` to every subscriber of `channel`.
    ///
    /// A failing subscriber does not stop delivery to the rest; the first
    /// failure is returned once all of them ran. Returns how many subscribers
    /// were notified.
    pub fn publish(&mut self, channel: &str, detail: Option<&T>) -> Result<usize, ChartError> {
        let Some(subscriptions) = self.channels.get_mut(channel) else {
            debug!(%channel, "no subscribers");
            return Ok(0);
        };

        let mut first_error = None;
        for subscription in subscriptions.iter_mut() {
            if let Err(err) = subscription.subscriber.notify(detail) {
                warn!(%channel, id = subscription.id.0, "subscriber failed: {err}");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(subscriptions.len()),
        }
    }
}
