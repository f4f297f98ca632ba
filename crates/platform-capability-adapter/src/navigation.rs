//! In-process route history.

use crate::NavigationCapability;
use parking_lot::Mutex;
use tracing::debug;

type RootExit = Box<dyn Fn() + Send + Sync>;

/// Route stack for hosts where navigation is history-based.
///
/// `go_back` at the root runs the root-exit hook if one is set (the
/// embedded host closes its web view there); otherwise it does nothing.
pub struct HistoryNavigator {
    stack: Mutex<Vec<String>>,
    on_root_back: Option<RootExit>,
}

impl HistoryNavigator {
    pub fn new(root: &str) -> Self {
        Self {
            stack: Mutex::new(vec![root.to_string()]),
            on_root_back: None,
        }
    }

    pub fn with_root_exit(mut self, exit: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_root_back = Some(Box::new(exit));
        self
    }

    pub fn history(&self) -> Vec<String> {
        self.stack.lock().clone()
    }
}

impl NavigationCapability for HistoryNavigator {
    fn navigate(&self, path: &str) {
        debug!(path, "Navigate");
        self.stack.lock().push(path.to_string());
    }

    fn go_back(&self) {
        let popped = {
            let mut stack = self.stack.lock();
            if stack.len() > 1 {
                stack.pop()
            } else {
                None
            }
        };
        if popped.is_none() {
            if let Some(exit) = &self.on_root_back {
                debug!("Back at root, leaving host view");
                exit();
            }
        }
    }

    fn replace(&self, path: &str) {
        debug!(path, "Replace route");
        let mut stack = self.stack.lock();
        match stack.last_mut() {
            Some(top) => *top = path.to_string(),
            None => stack.push(path.to_string()),
        }
    }

    fn current_route(&self) -> String {
        self.stack.lock().last().cloned().unwrap_or_default()
    }
}
