//! Parse error reporting
//!
//! The parser never unwinds on malformed input. Each grammar violation becomes
//! a [`ParseError`] that is recorded on the parser and delivered synchronously
//! to every registered [`ParserListener`].

use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// A grammar violation at a source position
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Observer notified of every parse error
pub trait ParserListener {
    fn on_error(&mut self, error: &ParseError);
}

impl<F> ParserListener for F
where
    F: FnMut(&ParseError),
{
    fn on_error(&mut self, error: &ParseError) {
        self(error)
    }
}

/// Listener handle as registered on a parser
pub type SharedListener = Rc<RefCell<dyn ParserListener>>;

/// Listener that keeps every error it sees
#[derive(Debug, Default)]
pub struct ErrorCollector {
    errors: Vec<ParseError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn take(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }
}

impl ParserListener for ErrorCollector {
    fn on_error(&mut self, error: &ParseError) {
        self.errors.push(error.clone());
    }
}

/// Set of listeners; a listener is identified by its allocation.
#[derive(Default)]
pub(crate) struct ListenerSet {
    listeners: Vec<SharedListener>,
}

impl ListenerSet {
    /// Returns `false` if the listener was already registered.
    pub(crate) fn insert(&mut self, listener: SharedListener) -> bool {
        if self.position(&listener).is_some() {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    pub(crate) fn remove(&mut self, listener: &SharedListener) -> bool {
        match self.position(listener) {
            Some(index) => {
                self.listeners.swap_remove(index);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn notify(&self, error: &ParseError) {
        for listener in &self.listeners {
            listener.borrow_mut().on_error(error);
        }
    }

    fn position(&self, listener: &SharedListener) -> Option<usize> {
        self.listeners
            .iter()
            .position(|known| std::ptr::addr_eq(Rc::as_ptr(known), Rc::as_ptr(listener)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let collector = Rc::new(RefCell::new(ErrorCollector::new()));
        let mut set = ListenerSet::default();

        assert!(set.insert(collector.clone()));
        assert!(!set.insert(collector.clone()));
        assert_eq!(set.len(), 1);

        set.notify(&ParseError::new(1, 2, "boom"));
        assert_eq!(collector.borrow().errors().len(), 1);

        let handle: SharedListener = collector.clone();
        assert!(set.remove(&handle));
        assert!(!set.remove(&handle));
        set.notify(&ParseError::new(1, 2, "ignored"));
        assert_eq!(collector.borrow().errors().len(), 1);
    }

    #[test]
    fn test_closure_listener() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let listener: SharedListener = Rc::new(RefCell::new(move |e: &ParseError| {
            sink.borrow_mut().push(e.line);
        }));

        let mut set = ListenerSet::default();
        set.insert(listener);
        set.notify(&ParseError::new(7, 1, "x"));
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn test_display() {
        let error = ParseError::new(3, 14, "expected ')'");
        assert_eq!(error.to_string(), "Parse error at line 3, column 14: expected ')'");
    }
}
