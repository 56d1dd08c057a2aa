// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A type-erased subscriber callback.
///
/// Handlers are reference counted so an emission can iterate over a snapshot of the
/// list while callbacks are free to subscribe or emit on the same bus.
type Handler = Rc<dyn Fn(&mut dyn Any)>;

/// A synchronous, type-routed publish/subscribe hub.
///
/// Subscriptions are keyed by the `TypeId` of the event. The bus uses interior
/// mutability so that it can be shared (`Rc<EventBus>`) between the frame driver
/// and the callbacks it invokes; a callback may emit further events (nested dispatch)
/// or add subscriptions while an emission is in flight.
///
/// Subscriptions are frame-scoped by convention: the driver calls [`EventBus::reset`]
/// once per frame and every interested party subscribes again before the next emission.
pub struct EventBus {
    subscribers: RefCell<HashMap<TypeId, Vec<Handler>>>,
}

impl EventBus {
    /// Creates an empty bus with no subscriptions.
    pub fn new() -> Self {
        log::trace!("EventBus initialized.");
        Self {
            subscribers: RefCell::new(HashMap::new()),
        }
    }

    /// Clears every subscription list.
    ///
    /// This is a hard clear: until something subscribes again, emitting any event
    /// invokes zero callbacks.
    pub fn reset(&self) {
        self.subscribers.borrow_mut().clear();
        log::trace!("EventBus reset.");
    }

    /// Subscribes `method`, bound to `owner`, to events of type `E`.
    ///
    /// The owner is held weakly; once every strong reference to it is dropped the
    /// callback silently stops firing. Subscribing the same pair twice produces two
    /// independent invocations per emission.
    ///
    /// A callback re-entering its own owner through a nested emission of the same
    /// event type violates the owner's `RefCell` borrow and panics.
    pub fn subscribe<E, O>(&self, owner: &Rc<RefCell<O>>, method: fn(&mut O, &mut E))
    where
        E: 'static,
        O: 'static,
    {
        let owner = Rc::downgrade(owner);
        self.push_handler::<E>(Rc::new(move |event: &mut dyn Any| {
            let Some(owner) = owner.upgrade() else {
                return;
            };
            if let Some(event) = event.downcast_mut::<E>() {
                let mut owner = owner.borrow_mut();
                method(&mut owner, event);
            }
        }));
    }

    /// Subscribes a free-standing closure to events of type `E`.
    pub fn subscribe_fn<E, F>(&self, callback: F)
    where
        E: 'static,
        F: Fn(&mut E) + 'static,
    {
        self.push_handler::<E>(Rc::new(move |event: &mut dyn Any| {
            if let Some(event) = event.downcast_mut::<E>() {
                callback(event);
            }
        }));
    }

    /// Dispatches `event` to every subscriber of `E`, in subscription order.
    ///
    /// The same event value is passed by mutable reference to each callback, so later
    /// callbacks observe mutations made by earlier ones. The event is handed back to the
    /// caller once every callback has returned.
    ///
    /// Dispatch runs over a snapshot of the subscriber list taken when the emission
    /// starts: subscriptions added by a callback are not invoked by this emission.
    pub fn emit<E: 'static>(&self, event: E) -> E {
        let mut event = event;
        let handlers: Vec<Handler> = match self.subscribers.borrow().get(&TypeId::of::<E>()) {
            Some(handlers) => handlers.clone(),
            None => return event,
        };

        for handler in &handlers {
            handler(&mut event);
        }
        event
    }

    /// Returns the number of callbacks currently subscribed to `E`.
    pub fn subscriber_count<E: 'static>(&self) -> usize {
        self.subscribers
            .borrow()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Returns `true` when no event type has a subscriber.
    pub fn is_empty(&self) -> bool {
        self.subscribers.borrow().values().all(Vec::is_empty)
    }

    fn push_handler<E: 'static>(&self, handler: Handler) {
        let mut subscribers = self.subscribers.borrow_mut();
        let handlers = subscribers.entry(TypeId::of::<E>()).or_default();
        handlers.push(handler);
        log::trace!(
            "Subscribed to {} ({} subscriber(s)).",
            type_name::<E>(),
            handlers.len()
        );
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.borrow();
        f.debug_struct("EventBus")
            .field("event_types", &subscribers.len())
            .field(
                "subscribers",
                &subscribers.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Hit {
        damage: i32,
        log: Vec<&'static str>,
    }

    impl Hit {
        fn new(damage: i32) -> Self {
            Self {
                damage,
                log: Vec::new(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct KeyDown(u32);

    #[derive(Default)]
    struct Recorder {
        seen: Vec<i32>,
    }

    impl Recorder {
        fn on_hit(&mut self, event: &mut Hit) {
            self.seen.push(event.damage);
        }
    }

    #[test]
    fn emit_without_subscribers_returns_event_untouched() {
        let bus = EventBus::new();
        let event = bus.emit(Hit::new(5));
        assert_eq!(event, Hit::new(5));
        assert!(bus.is_empty());
    }

    #[test]
    fn subscribers_run_in_subscription_order() {
        let bus = EventBus::new();
        bus.subscribe_fn(|event: &mut Hit| event.log.push("a"));
        bus.subscribe_fn(|event: &mut Hit| event.log.push("b"));
        bus.subscribe_fn(|event: &mut Hit| event.log.push("c"));

        let event = bus.emit(Hit::new(1));
        assert_eq!(event.log, vec!["a", "b", "c"]);
    }

    #[test]
    fn later_subscribers_observe_mutations() {
        let bus = EventBus::new();
        bus.subscribe_fn(|event: &mut Hit| event.damage *= 2);
        let observed = Rc::new(RefCell::new(0));
        let sink = observed.clone();
        bus.subscribe_fn(move |event: &mut Hit| *sink.borrow_mut() = event.damage);

        let event = bus.emit(Hit::new(21));
        assert_eq!(event.damage, 42);
        assert_eq!(*observed.borrow(), 42);
    }

    #[test]
    fn emission_is_isolated_by_event_type() {
        let bus = EventBus::new();
        let keys = Rc::new(RefCell::new(0));
        let sink = keys.clone();
        bus.subscribe_fn(move |_: &mut KeyDown| *sink.borrow_mut() += 1);

        bus.emit(Hit::new(3));
        assert_eq!(*keys.borrow(), 0, "Hit must not reach KeyDown subscribers");

        bus.emit(KeyDown(32));
        assert_eq!(*keys.borrow(), 1);
    }

    #[test]
    fn owner_method_subscription_is_not_deduplicated() {
        let bus = EventBus::new();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        bus.subscribe(&recorder, Recorder::on_hit);
        bus.subscribe(&recorder, Recorder::on_hit);

        bus.emit(Hit::new(7));
        assert_eq!(recorder.borrow().seen, vec![7, 7]);
        assert_eq!(bus.subscriber_count::<Hit>(), 2);
    }

    #[test]
    fn dropped_owner_is_skipped() {
        let bus = EventBus::new();
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        bus.subscribe(&recorder, Recorder::on_hit);
        drop(recorder);

        let event = bus.emit(Hit::new(9));
        assert_eq!(event.damage, 9);
    }

    #[test]
    fn reset_clears_every_subscription() {
        let bus = EventBus::new();
        let calls = Rc::new(RefCell::new(0));
        let sink = calls.clone();
        bus.subscribe_fn(move |_: &mut Hit| *sink.borrow_mut() += 1);

        bus.reset();
        bus.emit(Hit::new(1));
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(bus.subscriber_count::<Hit>(), 0);

        let sink = calls.clone();
        bus.subscribe_fn(move |_: &mut Hit| *sink.borrow_mut() += 1);
        bus.emit(Hit::new(1));
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn nested_emission_dispatches_other_event_types() {
        let bus = Rc::new(EventBus::new());
        let keys = Rc::new(RefCell::new(Vec::new()));

        let sink = keys.clone();
        bus.subscribe_fn(move |event: &mut KeyDown| sink.borrow_mut().push(event.0));

        let inner = Rc::downgrade(&bus);
        bus.subscribe_fn(move |event: &mut Hit| {
            if let Some(bus) = inner.upgrade() {
                bus.emit(KeyDown(event.damage as u32));
            }
        });

        bus.emit(Hit::new(4));
        assert_eq!(*keys.borrow(), vec![4]);
    }

    #[test]
    fn nested_emission_of_same_type_uses_current_list() {
        let bus = Rc::new(EventBus::new());
        let depth = Rc::new(RefCell::new(Vec::new()));

        let inner = Rc::downgrade(&bus);
        let sink = depth.clone();
        bus.subscribe_fn(move |event: &mut Hit| {
            sink.borrow_mut().push(event.damage);
            if event.damage > 0 {
                if let Some(bus) = inner.upgrade() {
                    bus.emit(Hit::new(event.damage - 1));
                }
            }
        });

        bus.emit(Hit::new(2));
        assert_eq!(*depth.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn subscription_during_emission_waits_for_next_emission() {
        let bus = Rc::new(EventBus::new());
        let late_calls = Rc::new(RefCell::new(0));

        let inner = Rc::downgrade(&bus);
        let sink = late_calls.clone();
        bus.subscribe_fn(move |_: &mut Hit| {
            if let Some(bus) = inner.upgrade() {
                let sink = sink.clone();
                bus.subscribe_fn(move |_: &mut Hit| *sink.borrow_mut() += 1);
            }
        });

        bus.emit(Hit::new(1));
        assert_eq!(*late_calls.borrow(), 0);
        assert_eq!(bus.subscriber_count::<Hit>(), 2);

        bus.emit(Hit::new(1));
        assert_eq!(*late_calls.borrow(), 1);
    }
}
