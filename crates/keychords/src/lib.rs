//! # keychords
//!
//! ## Overview
//!
//! This crate provides a small engine for binding actions to vim-style key
//! sequences and matching live key input against them incrementally.
//!
//! Bindings are registered on a [ChordMachine], either from notation via
//! [bind_str](ChordMachine::bind_str) or from already-parsed [KeySymbol]
//! sequences via [bind](ChordMachine::bind). The host hands each key press
//! to [input_key](ChordMachine::input_key), which appends it to the
//! in-progress input, classifies every registered trigger as an exact or
//! strict-prefix match, and decides whether to run an action, keep waiting
//! for more keys, or reset. The returned verdict tells the host whether the
//! key was consumed and should be withheld from its normal processing.
//!
//! While typed input could still extend into a longer trigger, nothing
//! fires and keys keep being consumed; pressing Return forces the best
//! candidate to fire immediately. Input that matches nothing clears the
//! in-progress sequence and is left for the host.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use keychords::{ChordMachine, Key, KeySymbol};
//!
//! let mut machine = ChordMachine::new();
//! let fired = Rc::new(RefCell::new(Vec::new()));
//!
//! let log = fired.clone();
//! machine.bind_str("<C-s>f", move || log.borrow_mut().push("save-file")).unwrap();
//!
//! let log = fired.clone();
//! machine.bind_str("<C-s>a", move || log.borrow_mut().push("save-all")).unwrap();
//!
//! // Control-S alone could still extend to either binding, so it's
//! // consumed without firing anything.
//! let ctrl_s: KeySymbol = "<C-s>".parse().unwrap();
//! assert_eq!(machine.input_key(ctrl_s), true);
//! assert!(fired.borrow().is_empty());
//!
//! // The "f" completes the first binding.
//! assert_eq!(machine.input_key(KeySymbol::from(Key::Char('f'))), true);
//! assert_eq!(*fired.borrow(), vec!["save-file"]);
//!
//! // Keys that match nothing are left for the host to handle.
//! assert_eq!(machine.input_key(KeySymbol::from(Key::Char('q'))), false);
//! ```

// Require docs for public APIs, and disable the more annoying clippy lints.
#![deny(missing_docs)]
#![allow(clippy::bool_to_int_with_if)]
#![allow(clippy::field_reassign_with_default)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]
#![allow(clippy::match_like_matches_macro)]
#![allow(clippy::needless_return)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
use std::fmt;

pub mod key;

pub use self::key::{keys_to_string, parse_keys, Key, KeyModifiers, KeySymbol, ParseError};

/// Error returned when no registered binding matches a trigger sequence.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
#[error("No binding found for {sequence}")]
pub struct NotFoundError {
    /// The formatted sequence that was looked up.
    pub sequence: String,
}

/// A zero-argument action run when its binding's trigger is fully matched.
pub type Action = Box<dyn FnMut()>;

/// An observer of the in-progress input, run after every processed key.
pub type InputObserver = Box<dyn FnMut(&[KeySymbol])>;

/// The base keys that are never stored in the in-progress input.
///
/// Return is filtered here too, but still drives the force-fire rule in
/// [ChordMachine::input_key].
const IGNORED: [Key; 4] = [Key::Shift, Key::Control, Key::Alt, Key::Return];

/// A registered trigger sequence and the action it runs.
pub struct Binding {
    keys: Vec<KeySymbol>,
    action: Action,
    description: Option<String>,
}

impl Binding {
    /// Create a binding that runs `action` once `keys` has been typed.
    ///
    /// Triggers must be non-empty.
    pub fn new<F>(keys: Vec<KeySymbol>, action: F) -> Self
    where
        F: FnMut() + 'static,
    {
        debug_assert!(!keys.is_empty());

        Binding {
            keys,
            action: Box::new(action),
            description: None,
        }
    }

    /// Attach a human-readable description.
    pub fn describe<T: Into<String>>(mut self, description: T) -> Self {
        self.description = Some(description.into());

        self
    }

    /// Return the trigger sequence.
    pub fn keys(&self) -> &[KeySymbol] {
        &self.keys
    }

    /// Return the description given at registration time, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("keys", &self.keys)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Match live key input against a set of registered key-sequence bindings.
#[derive(Default)]
pub struct ChordMachine {
    bindings: Vec<Binding>,
    typed: Vec<KeySymbol>,
    observers: Vec<InputObserver>,
}

impl ChordMachine {
    /// Return a new instance without any bindings.
    pub fn new() -> Self {
        ChordMachine::default()
    }

    /// Register a binding.
    ///
    /// Registration is append-only and always succeeds; several bindings may
    /// share one trigger sequence.
    pub fn bind(&mut self, binding: Binding) {
        self.bindings.push(binding);
    }

    /// Parse `keys` as notation and bind `action` to the result.
    ///
    /// Nothing is registered when the notation fails to parse, or when it
    /// yields no keys at all.
    pub fn bind_str<F>(&mut self, keys: &str, action: F) -> Result<(), ParseError>
    where
        F: FnMut() + 'static,
    {
        let keys = parse_keys(keys)?;

        if !keys.is_empty() {
            self.bind(Binding::new(keys, action));
        }

        return Ok(());
    }

    /// Find the first registered binding whose trigger equals `keys`.
    pub fn lookup(&self, keys: &[KeySymbol]) -> Result<&Binding, NotFoundError> {
        self.bindings
            .iter()
            .find(|b| b.keys == keys)
            .ok_or_else(|| NotFoundError { sequence: keys_to_string(keys) })
    }

    /// Register an observer that is run once after every processed key with
    /// the current in-progress input, including when a key just cleared it.
    pub fn observe<F>(&mut self, observer: F)
    where
        F: FnMut(&[KeySymbol]) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Return the keys typed since the last fire or reset.
    pub fn pending(&self) -> &[KeySymbol] {
        &self.typed
    }

    /// Process a typed key, returning whether it was consumed.
    ///
    /// The key is appended to the in-progress input unless it is a bare
    /// modifier or Return. Every registered trigger is then classified
    /// against the input:
    ///
    /// * a single full match with no longer trigger still reachable runs its
    ///   action and clears the input;
    /// * Return runs the best candidate immediately, full match or not, and
    ///   clears the input; with no candidates at all it just clears;
    /// * input that no trigger starts with clears and is reported
    ///   unconsumed, leaving the key to the host;
    /// * otherwise the input is retained and the key consumed while more
    ///   keys are awaited.
    ///
    /// When several triggers match the input in full, the one found last
    /// during the scan runs.
    pub fn input_key(&mut self, key: KeySymbol) -> bool {
        if !IGNORED.contains(&key.code()) {
            self.typed.push(key);
        }

        let mut candidates = Vec::new();
        let mut extendable = false;

        for (i, binding) in self.bindings.iter().enumerate() {
            if binding.keys == self.typed {
                candidates.insert(0, i);
            } else if binding.keys.len() > self.typed.len() &&
                binding.keys.starts_with(&self.typed)
            {
                candidates.push(i);
                extendable = true;
            }
        }

        let forced = key.code() == Key::Return;

        let handled = if (candidates.len() == 1 && !extendable) || forced {
            match candidates.first() {
                Some(&i) => {
                    (self.bindings[i].action)();
                    self.typed.clear();

                    true
                },
                None => {
                    // Return with nothing to fire.
                    self.typed.clear();

                    false
                },
            }
        } else if !extendable {
            self.typed.clear();

            false
        } else {
            true
        };

        for observer in self.observers.iter_mut() {
            observer(&self.typed);
        }

        return handled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    macro_rules! key {
        ($c: expr) => {
            KeySymbol::from(Key::Char($c))
        };
    }

    macro_rules! sym {
        ($k: expr) => {
            KeySymbol::from($k)
        };
    }

    type Fired = Rc<RefCell<Vec<&'static str>>>;

    fn logger(fired: &Fired, name: &'static str) -> impl FnMut() + 'static {
        let fired = Rc::clone(fired);

        move || fired.borrow_mut().push(name)
    }

    #[test]
    fn test_unique_exact_fires() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        machine.bind(Binding::new(vec![key!('a')], logger(&fired, "a")));

        assert_eq!(machine.input_key(key!('a')), true);
        assert_eq!(*fired.borrow(), vec!["a"]);
        assert_eq!(machine.pending(), &[]);
    }

    #[test]
    fn test_ambiguous_prefix_waits() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        machine.bind(Binding::new(vec![key!('a')], logger(&fired, "a")));
        machine.bind(Binding::new(vec![key!('a'), key!('b')], logger(&fired, "ab")));

        // "a" could still extend to "ab", so nothing fires yet.
        assert_eq!(machine.input_key(key!('a')), true);
        assert!(fired.borrow().is_empty());
        assert_eq!(machine.pending(), &[key!('a')]);

        assert_eq!(machine.input_key(key!('b')), true);
        assert_eq!(*fired.borrow(), vec!["ab"]);
        assert_eq!(machine.pending(), &[]);
    }

    #[test]
    fn test_dead_end_resets() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        machine.bind(Binding::new(vec![key!('a'), key!('b')], logger(&fired, "ab")));

        assert_eq!(machine.input_key(key!('c')), false);
        assert_eq!(machine.pending(), &[]);

        // A partial match dies the same way.
        assert_eq!(machine.input_key(key!('a')), true);
        assert_eq!(machine.input_key(key!('c')), false);
        assert_eq!(machine.pending(), &[]);
        assert!(fired.borrow().is_empty());
    }

    #[test]
    fn test_dead_end_idempotent() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        machine.bind(Binding::new(vec![key!('a')], logger(&fired, "a")));

        for _ in 0..5 {
            assert_eq!(machine.input_key(key!('z')), false);
            assert_eq!(machine.pending(), &[]);
        }

        assert!(fired.borrow().is_empty());
    }

    #[test]
    fn test_return_fires_exact_candidate() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        machine.bind(Binding::new(vec![key!('a')], logger(&fired, "a")));
        machine.bind(Binding::new(vec![key!('a'), key!('b')], logger(&fired, "ab")));

        assert_eq!(machine.input_key(key!('a')), true);
        assert_eq!(machine.input_key(sym!(Key::Return)), true);

        // The exact match outranks the longer candidate.
        assert_eq!(*fired.borrow(), vec!["a"]);
        assert_eq!(machine.pending(), &[]);
    }

    #[test]
    fn test_return_fires_partial_match() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        machine.bind(Binding::new(vec![key!('a'), key!('b')], logger(&fired, "ab")));

        assert_eq!(machine.input_key(key!('a')), true);
        assert_eq!(machine.input_key(sym!(Key::Return)), true);

        // Return runs the candidate even though its trigger was only
        // partially typed.
        assert_eq!(*fired.borrow(), vec!["ab"]);
    }

    #[test]
    fn test_return_with_no_candidates() {
        let mut machine = ChordMachine::new();

        assert_eq!(machine.input_key(sym!(Key::Return)), false);
        assert_eq!(machine.pending(), &[]);
    }

    #[test]
    fn test_return_on_empty_input_uses_registration_order() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        machine.bind(Binding::new(vec![key!('a'), key!('b')], logger(&fired, "ab")));
        machine.bind(Binding::new(vec![key!('c')], logger(&fired, "c")));

        // With nothing typed, every trigger is still reachable, and Return
        // picks the earliest-registered one.
        assert_eq!(machine.input_key(sym!(Key::Return)), true);
        assert_eq!(*fired.borrow(), vec!["ab"]);
    }

    #[test]
    fn test_duplicate_triggers() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        machine.bind(Binding::new(vec![key!('q')], logger(&fired, "first")));
        machine.bind(Binding::new(vec![key!('q')], logger(&fired, "second")));
        machine.bind(Binding::new(vec![key!('q'), key!('x')], logger(&fired, "qx")));

        // Two full matches is never "exactly one", so the input stays
        // pending on the longer trigger.
        assert_eq!(machine.input_key(key!('q')), true);
        assert!(fired.borrow().is_empty());
        assert_eq!(machine.pending(), &[key!('q')]);

        // The full match found last during the scan ends up first, so
        // Return runs the later registration.
        assert_eq!(machine.input_key(sym!(Key::Return)), true);
        assert_eq!(*fired.borrow(), vec!["second"]);
    }

    #[test]
    fn test_duplicate_triggers_dead_end_without_extension() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        machine.bind(Binding::new(vec![key!('q')], logger(&fired, "first")));
        machine.bind(Binding::new(vec![key!('q')], logger(&fired, "second")));

        assert_eq!(machine.input_key(key!('q')), false);
        assert_eq!(machine.pending(), &[]);
        assert!(fired.borrow().is_empty());
    }

    #[test]
    fn test_ignored_keys_not_stored() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        machine.bind(Binding::new(vec![key!('a')], logger(&fired, "a")));

        assert_eq!(machine.input_key(sym!(Key::Control)), true);
        assert_eq!(machine.input_key(sym!(Key::Shift)), true);
        assert_eq!(machine.pending(), &[]);
        assert!(fired.borrow().is_empty());

        assert_eq!(machine.input_key(key!('a')), true);
        assert_eq!(*fired.borrow(), vec!["a"]);
    }

    #[test]
    fn test_ignored_keys_with_empty_registry() {
        let mut machine = ChordMachine::new();

        assert_eq!(machine.input_key(sym!(Key::Control)), false);
        assert_eq!(machine.pending(), &[]);
    }

    #[test]
    fn test_observer_runs_every_key() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();
        let seen = Rc::new(RefCell::new(Vec::new()));

        machine.bind(Binding::new(vec![key!('a'), key!('b')], logger(&fired, "ab")));

        let log = seen.clone();
        machine.observe(move |keys| log.borrow_mut().push(keys_to_string(keys)));

        machine.input_key(key!('a'));
        machine.input_key(key!('b'));
        machine.input_key(sym!(Key::Control));
        machine.input_key(key!('z'));

        // One notification per processed key, cleared after the fire, on the
        // ignored key, and on the dead end.
        assert_eq!(*seen.borrow(), vec!["a", "", "", ""]);
    }

    #[test]
    fn test_lookup() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        let keys = parse_keys("<C-s>f").unwrap();
        machine.bind(Binding::new(keys.clone(), logger(&fired, "save")).describe("Save file"));
        machine.bind(Binding::new(keys.clone(), logger(&fired, "later")));

        // The earliest registration wins lookups.
        let binding = machine.lookup(&keys).unwrap();
        assert_eq!(binding.keys(), &keys[..]);
        assert_eq!(binding.description(), Some("Save file"));

        let missing = machine.lookup(&[key!('q')]);
        assert_eq!(missing.unwrap_err(), NotFoundError { sequence: "q".into() });
    }

    #[test]
    fn test_bind_str_failure_registers_nothing() {
        let mut machine = ChordMachine::new();

        let res = machine.bind_str("<X-a>", || {});
        assert_eq!(res, Err(ParseError::UnrecognisedModifier));
        assert!(machine.bindings.is_empty());
    }

    #[test]
    fn test_bind_str_sequence() {
        let mut machine = ChordMachine::new();
        let fired = Fired::default();

        machine.bind_str("<C-s>f", logger(&fired, "save")).unwrap();

        let ctrl_s = KeySymbol::new(Key::Char('s'), KeyModifiers::CONTROL);

        assert_eq!(machine.input_key(ctrl_s), true);
        assert_eq!(machine.pending(), &[ctrl_s]);
        assert_eq!(machine.input_key(key!('f')), true);
        assert_eq!(*fired.borrow(), vec!["save"]);
        assert_eq!(machine.pending(), &[]);
    }
}
