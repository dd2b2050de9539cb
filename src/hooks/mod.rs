//! Hooks Module
//!
//! The capability interface through which the topic manager reports
//! subscription transitions to the embedding application.

use std::sync::Arc;


/// Subscription transition hooks
///
/// Both methods run synchronously on the thread that delivered the
/// subscribe/unsubscribe event, so they hold up the broker's event dispatch
/// for as long as they take. Keep them short or hand the work off to a task.
/// Panics are not caught and propagate to the notifying caller.
pub trait SubscriptionHooks: Send + Sync {
    /// Called when a filter goes from zero subscribers to one
    fn on_first_subscriber(&self, _filter: &str) {
        // Default: no-op
    }

    /// Called when a filter goes from one subscriber to zero
    fn on_last_unsubscriber(&self, _filter: &str) {
        // Default: no-op
    }
}

/// Default hooks implementation that ignores every transition
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl SubscriptionHooks for DefaultHooks {}

/// Hooks built from a pair of closures
pub struct FnHooks<F, L> {
    on_first: F,
    on_last: L,
}

impl<F, L> FnHooks<F, L>
where
    F: Fn(&str) + Send + Sync,
    L: Fn(&str) + Send + Sync,
{
    pub fn new(on_first: F, on_last: L) -> Self {
        Self { on_first, on_last }
    }
}

impl<F, L> SubscriptionHooks for FnHooks<F, L>
where
    F: Fn(&str) + Send + Sync,
    L: Fn(&str) + Send + Sync,
{
    fn on_first_subscriber(&self, filter: &str) {
        (self.on_first)(filter);
    }

    fn on_last_unsubscriber(&self, filter: &str) {
        (self.on_last)(filter);
    }
}

/// Implement SubscriptionHooks for Arc<T> where T: SubscriptionHooks
/// This allows Arc-wrapped hook providers to be used directly
impl<T: SubscriptionHooks + ?Sized> SubscriptionHooks for Arc<T> {
    fn on_first_subscriber(&self, filter: &str) {
        (**self).on_first_subscriber(filter);
    }

    fn on_last_unsubscriber(&self, filter: &str) {
        (**self).on_last_unsubscriber(filter);
    }
}

/// Composite hooks that fans every transition out to several implementations,
/// in the order they were added
pub struct CompositeHooks {
    hooks: Vec<Box<dyn SubscriptionHooks>>,
}

impl CompositeHooks {
    /// Create a new composite hooks instance
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Add a hooks implementation
    pub fn add<H: SubscriptionHooks + 'static>(&mut self, hooks: H) {
        self.hooks.push(Box::new(hooks));
    }

    /// Add a hooks implementation and return self for chaining
    pub fn with<H: SubscriptionHooks + 'static>(mut self, hooks: H) -> Self {
        self.add(hooks);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl Default for CompositeHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionHooks for CompositeHooks {
    fn on_first_subscriber(&self, filter: &str) {
        for hooks in &self.hooks {
            hooks.on_first_subscriber(filter);
        }
    }

    fn on_last_unsubscriber(&self, filter: &str) {
        for hooks in &self.hooks {
            hooks.on_last_unsubscriber(filter);
        }
    }
}
