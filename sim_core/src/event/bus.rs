//! Priority-ordered event dispatch

use super::{Event, EventKind};
use std::collections::{HashMap, VecDeque};

const HISTORY_CAP: usize = 100;

type Listener = Box<dyn FnMut(&mut Event)>;

struct Entry {
    id: u64,
    priority: i32,
    once: bool,
    fired: bool,
    callback: Listener,
}

/// Handle returned by subscribe; pass back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle {
    kind: Option<EventKind>,
    id: u64,
}

/// The bus. Global listeners run before kind-specific ones; within each
/// group, higher priority first, insertion order on ties. A listener that
/// cancels the event stops the remaining chain.
///
/// Every emitted event is also cloned into a short diagnostics ring and into
/// a deferred queue the scheduler drains for world reactions (gear triggers,
/// QTE readiness), so listeners themselves never need world access.
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<Entry>>,
    global: Vec<Entry>,
    history: VecDeque<Event>,
    deferred: Vec<Event>,
    next_id: u64,
    disabled: bool,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus::default()
    }

    /// Subscribe to one event kind. Higher priority runs earlier; `once`
    /// listeners are removed after their first firing.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        priority: i32,
        once: bool,
        callback: impl FnMut(&mut Event) + 'static,
    ) -> ListenerHandle {
        let id = self.fresh_id();
        let entries = self.listeners.entry(kind).or_default();
        Self::insert_sorted(entries, Entry { id, priority, once, fired: false, callback: Box::new(callback) });
        ListenerHandle { kind: Some(kind), id }
    }

    /// Subscribe to every event kind.
    pub fn subscribe_all(
        &mut self,
        priority: i32,
        callback: impl FnMut(&mut Event) + 'static,
    ) -> ListenerHandle {
        let id = self.fresh_id();
        Self::insert_sorted(
            &mut self.global,
            Entry { id, priority, once: false, fired: false, callback: Box::new(callback) },
        );
        ListenerHandle { kind: None, id }
    }

    pub fn unsubscribe(&mut self, handle: ListenerHandle) {
        match handle.kind {
            Some(kind) => {
                if let Some(entries) = self.listeners.get_mut(&kind) {
                    entries.retain(|e| e.id != handle.id);
                }
            }
            None => self.global.retain(|e| e.id != handle.id),
        }
    }

    /// Dispatch an event through the listener chains, mutating it in place.
    pub fn emit(&mut self, event: &mut Event) {
        if self.disabled {
            return;
        }

        for entry in &mut self.global {
            if event.cancelled {
                break;
            }
            (entry.callback)(event);
            entry.fired = true;
        }

        if let Some(entries) = self.listeners.get_mut(&event.kind) {
            for entry in entries.iter_mut() {
                if event.cancelled {
                    break;
                }
                (entry.callback)(event);
                entry.fired = true;
            }
            entries.retain(|e| !(e.once && e.fired));
        }

        self.history.push_back(event.clone());
        if self.history.len() > HISTORY_CAP {
            self.history.pop_front();
        }
        self.deferred.push(event.clone());
    }

    /// Build-and-emit shorthand; returns the event after dispatch.
    pub fn emit_new(&mut self, event: Event) -> Event {
        let mut event = event;
        self.emit(&mut event);
        event
    }

    /// Take the queue of events emitted since the last drain.
    pub fn drain_deferred(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.deferred)
    }

    /// Recent events, newest first, optionally filtered by kind.
    pub fn recent(&self, kind: Option<EventKind>, limit: usize) -> Vec<&Event> {
        self.history
            .iter()
            .rev()
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .take(limit)
            .collect()
    }

    pub fn listener_count(&self, kind: Option<EventKind>) -> usize {
        match kind {
            Some(kind) => self.listeners.get(&kind).map_or(0, Vec::len),
            None => self.listeners.values().map(Vec::len).sum::<usize>() + self.global.len(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }

    fn fresh_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Keep entries sorted by priority descending; ties keep insertion order.
    fn insert_sorted(entries: &mut Vec<Entry>, entry: Entry) {
        let pos = entries
            .iter()
            .position(|e| e.priority < entry.priority)
            .unwrap_or(entries.len());
        entries.insert(pos, entry);
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listener_count", &self.listener_count(None))
            .field("history_len", &self.history.len())
            .field("disabled", &self.disabled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::PayloadValue;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_priority_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for (name, priority) in [("low", 0), ("high", 10), ("mid", 5)] {
            let order = Rc::clone(&order);
            bus.subscribe(EventKind::Custom, priority, false, move |_| {
                order.borrow_mut().push(name);
            });
        }
        bus.emit_new(Event::new(EventKind::Custom, 0));
        assert_eq!(*order.borrow(), vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_equal_priority_keeps_insertion_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        for name in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            bus.subscribe(EventKind::Custom, 0, false, move |_| {
                order.borrow_mut().push(name);
            });
        }
        bus.emit_new(Event::new(EventKind::Custom, 0));
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_cancellation_stops_chain() {
        let reached = Rc::new(RefCell::new(false));
        let mut bus = EventBus::new();
        bus.subscribe(EventKind::PreDamage, 10, false, |event| event.cancel());
        {
            let reached = Rc::clone(&reached);
            bus.subscribe(EventKind::PreDamage, 0, false, move |_| {
                *reached.borrow_mut() = true;
            });
        }
        let event = bus.emit_new(Event::new(EventKind::PreDamage, 0));
        assert!(event.cancelled);
        assert!(!*reached.borrow());
    }

    #[test]
    fn test_once_listener_removed_after_firing() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        {
            let count = Rc::clone(&count);
            bus.subscribe(EventKind::Custom, 0, true, move |_| {
                *count.borrow_mut() += 1;
            });
        }
        bus.emit_new(Event::new(EventKind::Custom, 0));
        bus.emit_new(Event::new(EventKind::Custom, 0));
        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(Some(EventKind::Custom)), 0);
    }

    #[test]
    fn test_listener_mutates_payload() {
        let mut bus = EventBus::new();
        bus.subscribe(EventKind::PreDamage, 0, false, |event| {
            event.set("damage", PayloadValue::Number(42.0));
        });
        let event = bus.emit_new(
            Event::new(EventKind::PreDamage, 0).with("damage", PayloadValue::Number(7.0)),
        );
        assert_eq!(event.number("damage"), Some(42.0));
        assert!(event.modified);
    }

    #[test]
    fn test_disabled_bus_is_silent() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        {
            let count = Rc::clone(&count);
            bus.subscribe(EventKind::Custom, 0, false, move |_| {
                *count.borrow_mut() += 1;
            });
        }
        bus.set_enabled(false);
        bus.emit_new(Event::new(EventKind::Custom, 0));
        assert_eq!(*count.borrow(), 0);
        assert!(bus.drain_deferred().is_empty());
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let handle = {
            let count = Rc::clone(&count);
            bus.subscribe(EventKind::Custom, 0, false, move |_| {
                *count.borrow_mut() += 1;
            })
        };
        bus.unsubscribe(handle);
        bus.emit_new(Event::new(EventKind::Custom, 0));
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_history_ring_capped() {
        let mut bus = EventBus::new();
        for i in 0..150 {
            bus.emit_new(Event::new(EventKind::TickStart, i));
        }
        assert_eq!(bus.recent(None, 200).len(), 100);
        assert_eq!(bus.recent(None, 1)[0].tick, 149);
    }
}
