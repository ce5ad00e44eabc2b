//! Chain-of-responsibility event routing.
//!
//! Responders live in a table owned by [`ResponderChain`]. Each entry holds at
//! most one `next` link, which is an id into the same table rather than a second
//! owner, so the chain is plain data that [`ResponderChain::dispatch`] walks in a
//! loop. The chain always ends at a responder with no `next` (the application).
//!
//! At most one responder is the *first responder*: the target for keyboard
//! input. It is changed only through [`ResponderChain::make_first_responder`].

pub mod event;

use std::collections::HashMap;

pub use event::{InputEvent, InputKind, KeyPayload, Modifiers};
use serde::Serialize;

/// Identifier of a responder in a [`ResponderChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResponderId(u64);

impl std::fmt::Display for ResponderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "r{}", self.0) }
}

/// Result of offering an event to a responder or a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Some responder consumed the event.
    Handled,
    /// The event fell off the end of the chain.
    Unhandled,
}

/// Errors from editing the chain's links.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResponderError {
    /// The responder id is not in the chain.
    #[error("unknown responder {0}")]
    Unknown(ResponderId),

    /// The link would make the chain loop back on itself.
    #[error("linking {from} to {to} would create a cycle")]
    Cycle { from: ResponderId, to: ResponderId },
}

/// An object that can handle input or pass it on.
///
/// Every handler defaults to [`Outcome::Unhandled`], which forwards the event to
/// the `next` responder. Override a handler and return [`Outcome::Handled`] to
/// consume the event.
pub trait Responder: Send {
    /// Whether this responder may become the first responder.
    fn accepts_first_responder(&self) -> bool { false }

    /// Called after this responder became the first responder.
    fn did_become_first_responder(&mut self) {}

    /// Called after this responder stopped being the first responder.
    fn did_resign_first_responder(&mut self) {}

    fn pointer_down(&mut self, _event: &mut InputEvent) -> Outcome { Outcome::Unhandled }
    fn pointer_up(&mut self, _event: &mut InputEvent) -> Outcome { Outcome::Unhandled }
    fn pointer_move(&mut self, _event: &mut InputEvent) -> Outcome { Outcome::Unhandled }
    fn pointer_drag(&mut self, _event: &mut InputEvent) -> Outcome { Outcome::Unhandled }
    fn pointer_enter(&mut self, _event: &mut InputEvent) -> Outcome { Outcome::Unhandled }
    fn pointer_exit(&mut self, _event: &mut InputEvent) -> Outcome { Outcome::Unhandled }
    fn scroll(&mut self, _event: &mut InputEvent) -> Outcome { Outcome::Unhandled }
    fn key_down(&mut self, _event: &mut InputEvent) -> Outcome { Outcome::Unhandled }
    fn key_up(&mut self, _event: &mut InputEvent) -> Outcome { Outcome::Unhandled }
}

/// Offers `event` to the handler matching its kind.
fn route(responder: &mut dyn Responder, event: &mut InputEvent) -> Outcome {
    match event.kind {
        InputKind::PointerDown => responder.pointer_down(event),
        InputKind::PointerUp => responder.pointer_up(event),
        InputKind::PointerMove => responder.pointer_move(event),
        InputKind::PointerDrag => responder.pointer_drag(event),
        InputKind::PointerEnter => responder.pointer_enter(event),
        InputKind::PointerExit => responder.pointer_exit(event),
        InputKind::Scroll => responder.scroll(event),
        InputKind::KeyDown => responder.key_down(event),
        InputKind::KeyUp => responder.key_up(event),
    }
}

struct Node {
    responder: Box<dyn Responder>,
    next: Option<ResponderId>,
}

/// Table of responders plus the first-responder slot.
#[derive(Default)]
pub struct ResponderChain {
    nodes: HashMap<ResponderId, Node>,
    first_responder: Option<ResponderId>,
    next_id: u64,
}

impl ResponderChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Adds a responder with the given `next` link.
    ///
    /// # Errors
    ///
    /// Returns [`ResponderError::Unknown`] if `next` is not in the chain.
    pub fn insert(
        &mut self,
        responder: Box<dyn Responder>,
        next: Option<ResponderId>,
    ) -> Result<ResponderId, ResponderError> {
        if let Some(next) = next
            && !self.nodes.contains_key(&next)
        {
            return Err(ResponderError::Unknown(next));
        }

        Ok(self.push(responder, next))
    }

    /// Adds a responder that ends its chain.
    pub fn insert_terminal(&mut self, responder: Box<dyn Responder>) -> ResponderId {
        self.push(responder, None)
    }

    fn push(&mut self, responder: Box<dyn Responder>, next: Option<ResponderId>) -> ResponderId {
        let id = ResponderId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node { responder, next });
        id
    }

    /// Removes a responder.
    ///
    /// Responders that pointed at it are relinked to its `next`, so the chain
    /// stays connected. If it was the first responder it is resigned first.
    pub fn remove(&mut self, id: ResponderId) -> Option<Box<dyn Responder>> {
        if self.first_responder == Some(id) {
            self.make_first_responder(None);
        }

        let node = self.nodes.remove(&id)?;
        for other in self.nodes.values_mut() {
            if other.next == Some(id) {
                other.next = node.next;
            }
        }
        Some(node.responder)
    }

    /// Returns whether `id` is in the chain.
    #[must_use]
    pub fn contains(&self, id: ResponderId) -> bool { self.nodes.contains_key(&id) }

    /// Number of responders in the table.
    #[must_use]
    pub fn len(&self) -> usize { self.nodes.len() }

    /// Returns true if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// Returns the `next` link of `id`.
    #[must_use]
    pub fn next(&self, id: ResponderId) -> Option<ResponderId> {
        self.nodes.get(&id).and_then(|node| node.next)
    }

    /// Relinks `id` to forward to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`ResponderError::Unknown`] for ids not in the chain and
    /// [`ResponderError::Cycle`] if `next` already forwards (directly or not) to
    /// `id`. The chain is left unchanged on error.
    pub fn set_next(
        &mut self,
        id: ResponderId,
        next: Option<ResponderId>,
    ) -> Result<(), ResponderError> {
        if !self.nodes.contains_key(&id) {
            return Err(ResponderError::Unknown(id));
        }
        if let Some(target) = next {
            if !self.nodes.contains_key(&target) {
                return Err(ResponderError::Unknown(target));
            }
            if self.chain_from(target).contains(&id) {
                tracing::error!(from = %id, to = %target, "rejected cyclic responder link");
                return Err(ResponderError::Cycle { from: id, to: target });
            }
        }

        if let Some(node) = self.nodes.get_mut(&id) {
            node.next = next;
        }
        Ok(())
    }

    /// Returns `id` followed by every responder its events would reach.
    #[must_use]
    pub fn chain_from(&self, id: ResponderId) -> Vec<ResponderId> {
        let mut chain = Vec::new();
        let mut cursor = self.nodes.contains_key(&id).then_some(id);
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.next(current);
        }
        chain
    }

    /// Returns the current first responder.
    #[must_use]
    pub const fn first_responder(&self) -> Option<ResponderId> { self.first_responder }

    /// Returns whether `id` accepts first-responder status.
    #[must_use]
    pub fn accepts_first_responder(&self, id: ResponderId) -> bool {
        self.nodes.get(&id).is_some_and(|node| node.responder.accepts_first_responder())
    }

    /// Makes `candidate` the first responder, or clears focus with `None`.
    ///
    /// Returns `false`, changing nothing, when the candidate is unknown or does
    /// not accept first-responder status. Otherwise the current first responder
    /// is resigned, the candidate installed and notified, and `true` returned.
    pub fn make_first_responder(&mut self, candidate: Option<ResponderId>) -> bool {
        if let Some(id) = candidate
            && !self.accepts_first_responder(id)
        {
            tracing::trace!(responder = %id, "first responder change refused");
            return false;
        }
        if candidate == self.first_responder {
            return true;
        }

        if let Some(node) = self.first_responder.take().and_then(|old| self.nodes.get_mut(&old)) {
            node.responder.did_resign_first_responder();
        }

        self.first_responder = candidate;
        if let Some(node) = candidate.and_then(|new| self.nodes.get_mut(&new)) {
            node.responder.did_become_first_responder();
        }

        tracing::debug!(responder = ?candidate, "first responder changed");
        true
    }

    /// Offers `event` to `target`, then to each `next` responder in turn.
    ///
    /// Stops at the first responder that handles the event, marking it consumed.
    /// An event that arrives already consumed is not offered to anyone.
    pub fn dispatch(&mut self, target: ResponderId, event: &mut InputEvent) -> Outcome {
        let mut cursor = Some(target);

        while let Some(id) = cursor {
            if event.is_consumed() {
                break;
            }
            let Some(node) = self.nodes.get_mut(&id) else {
                tracing::warn!(responder = %id, "dispatch reached unknown responder");
                break;
            };

            if route(node.responder.as_mut(), event) == Outcome::Handled {
                event.consume();
            }
            cursor = node.next;
        }

        if event.is_consumed() {
            Outcome::Handled
        } else {
            Outcome::Unhandled
        }
    }

    /// Offers `event` starting at the first responder, if there is one.
    pub fn dispatch_to_first_responder(&mut self, event: &mut InputEvent) -> Outcome {
        match self.first_responder {
            Some(target) => self.dispatch(target, event),
            None => Outcome::Unhandled,
        }
    }
}

impl std::fmt::Debug for ResponderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponderChain")
            .field("len", &self.nodes.len())
            .field("first_responder", &self.first_responder)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Records every call; consumes the kinds listed in `consumes`.
    struct Probe {
        name: &'static str,
        accepts: bool,
        consumes: Vec<InputKind>,
        log: Log,
    }

    impl Probe {
        fn boxed(name: &'static str, accepts: bool, consumes: &[InputKind], log: &Log) -> Box<Self> {
            Box::new(Self {
                name,
                accepts,
                consumes: consumes.to_vec(),
                log: Arc::clone(log),
            })
        }

        fn offer(&self, event: &InputEvent) -> Outcome {
            self.log.lock().push(format!("{}:{:?}", self.name, event.kind));
            if self.consumes.contains(&event.kind) {
                Outcome::Handled
            } else {
                Outcome::Unhandled
            }
        }
    }

    impl Responder for Probe {
        fn accepts_first_responder(&self) -> bool { self.accepts }

        fn did_become_first_responder(&mut self) { self.log.lock().push(format!("{}:become", self.name)); }

        fn did_resign_first_responder(&mut self) { self.log.lock().push(format!("{}:resign", self.name)); }

        fn pointer_down(&mut self, event: &mut InputEvent) -> Outcome { self.offer(event) }

        fn key_down(&mut self, event: &mut InputEvent) -> Outcome { self.offer(event) }
    }

    fn chain_of_three(log: &Log, app_consumes: &[InputKind]) -> (ResponderChain, [ResponderId; 3]) {
        let mut chain = ResponderChain::new();
        let app = chain.insert(Probe::boxed("app", false, app_consumes, log), None).unwrap();
        let window = chain.insert(Probe::boxed("window", true, &[], log), Some(app)).unwrap();
        let view = chain.insert(Probe::boxed("view", true, &[], log), Some(window)).unwrap();
        (chain, [app, window, view])
    }

    #[test]
    fn test_unhandled_event_walks_whole_chain() {
        let log = Log::default();
        let (mut chain, [_, _, view]) = chain_of_three(&log, &[]);

        let mut event = InputEvent::pointer(InputKind::PointerDown, 0.0, 0.0);
        assert_eq!(chain.dispatch(view, &mut event), Outcome::Unhandled);
        assert!(!event.is_consumed());
        assert_eq!(*log.lock(), vec!["view:PointerDown", "window:PointerDown", "app:PointerDown"]);
    }

    #[test]
    fn test_handled_event_stops_propagation() {
        let log = Log::default();
        let mut chain = ResponderChain::new();
        let app = chain.insert(Probe::boxed("app", false, &[], &log), None).unwrap();
        let window =
            chain.insert(Probe::boxed("window", false, &[InputKind::KeyDown], &log), Some(app)).unwrap();

        let mut event = InputEvent::key(InputKind::KeyDown, 1, Modifiers::default());
        assert_eq!(chain.dispatch(window, &mut event), Outcome::Handled);
        assert!(event.is_consumed());
        assert_eq!(*log.lock(), vec!["window:KeyDown"]);
    }

    #[test]
    fn test_consumed_event_is_not_offered() {
        let log = Log::default();
        let (mut chain, [_, _, view]) = chain_of_three(&log, &[]);

        let mut event = InputEvent::pointer(InputKind::PointerDown, 0.0, 0.0);
        event.consume();
        assert_eq!(chain.dispatch(view, &mut event), Outcome::Handled);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_default_handlers_forward() {
        struct Silent;
        impl Responder for Silent {}

        let log = Log::default();
        let mut chain = ResponderChain::new();
        let app =
            chain.insert(Probe::boxed("app", false, &[InputKind::PointerDown], &log), None).unwrap();
        let silent = chain.insert(Box::new(Silent), Some(app)).unwrap();

        let mut event = InputEvent::pointer(InputKind::PointerDown, 0.0, 0.0);
        assert_eq!(chain.dispatch(silent, &mut event), Outcome::Handled);
        assert_eq!(*log.lock(), vec!["app:PointerDown"]);
    }

    #[test]
    fn test_make_first_responder_rejects_non_accepting() {
        let log = Log::default();
        let (mut chain, [app, window, _]) = chain_of_three(&log, &[]);

        assert!(chain.make_first_responder(Some(window)));
        assert!(!chain.make_first_responder(Some(app)));
        assert_eq!(chain.first_responder(), Some(window));
        assert_eq!(*log.lock(), vec!["window:become"]);
    }

    #[test]
    fn test_make_first_responder_resigns_previous() {
        let log = Log::default();
        let (mut chain, [_, window, view]) = chain_of_three(&log, &[]);

        assert!(chain.make_first_responder(Some(window)));
        assert!(chain.make_first_responder(Some(view)));
        assert!(chain.make_first_responder(None));
        assert_eq!(chain.first_responder(), None);
        assert_eq!(
            *log.lock(),
            vec!["window:become", "window:resign", "view:become", "view:resign"]
        );
    }

    #[test]
    fn test_reinstalling_first_responder_is_noop() {
        let log = Log::default();
        let (mut chain, [_, window, _]) = chain_of_three(&log, &[]);

        assert!(chain.make_first_responder(Some(window)));
        assert!(chain.make_first_responder(Some(window)));
        assert_eq!(*log.lock(), vec!["window:become"]);
    }

    #[test]
    fn test_key_dispatch_starts_at_first_responder() {
        let log = Log::default();
        let (mut chain, [_, window, _]) = chain_of_three(&log, &[InputKind::KeyDown]);

        let mut event = InputEvent::key(InputKind::KeyDown, 1, Modifiers::default());
        assert_eq!(chain.dispatch_to_first_responder(&mut event), Outcome::Unhandled);

        chain.make_first_responder(Some(window));
        log.lock().clear();
        assert_eq!(chain.dispatch_to_first_responder(&mut event), Outcome::Handled);
        assert_eq!(*log.lock(), vec!["window:KeyDown", "app:KeyDown"]);
    }

    #[test]
    fn test_set_next_rejects_cycles() {
        let log = Log::default();
        let (mut chain, [app, window, view]) = chain_of_three(&log, &[]);

        assert_eq!(
            chain.set_next(app, Some(view)),
            Err(ResponderError::Cycle { from: app, to: view })
        );
        assert_eq!(chain.set_next(view, Some(view)), Err(ResponderError::Cycle { from: view, to: view }));
        assert_eq!(chain.next(app), None);
        assert_eq!(chain.chain_from(view), vec![view, window, app]);
    }

    #[test]
    fn test_insert_with_unknown_next_fails() {
        let mut chain = ResponderChain::new();
        let app = chain.insert(Box::new(ProbeFree), None).unwrap();
        chain.remove(app);
        assert_eq!(chain.insert(Box::new(ProbeFree), Some(app)).err(), Some(ResponderError::Unknown(app)));
    }

    struct ProbeFree;
    impl Responder for ProbeFree {}

    #[test]
    fn test_remove_splices_chain_and_resigns() {
        let log = Log::default();
        let (mut chain, [app, window, view]) = chain_of_three(&log, &[]);

        chain.make_first_responder(Some(window));
        assert!(chain.remove(window).is_some());

        assert_eq!(chain.first_responder(), None);
        assert_eq!(chain.chain_from(view), vec![view, app]);
        assert_eq!(chain.len(), 2);
        assert!(log.lock().contains(&"window:resign".to_string()));
    }
}
