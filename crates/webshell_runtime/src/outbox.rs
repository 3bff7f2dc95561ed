use std::{cell::RefCell, collections::VecDeque, rc::Rc};

/// Messages posted by scripts through `window.ReactNativeWebView.postMessage`, oldest first.
///
/// Shared between the op state and the [`crate::DenoWebView`] that drains it.
#[derive(Debug, Clone, Default)]
pub struct Outbox(Rc<RefCell<VecDeque<String>>>);

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: String) {
        self.0.borrow_mut().push_back(message);
    }

    pub fn pop(&self) -> Option<String> {
        self.0.borrow_mut().pop_front()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Removes and returns every queued message
    pub fn drain(&self) -> Vec<String> {
        self.0.borrow_mut().drain(..).collect()
    }
}
