use parking_lot::RwLock;
use std::sync::Arc;

use crate::output::{GameNotifier, Notice};

#[derive(Clone, Default)]
pub struct MockNotifier {
    notices: Arc<RwLock<Vec<Notice>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn flush(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.write())
    }

    pub fn contains(&self, notice: &Notice) -> bool {
        self.notices.read().iter().any(|n| n == notice)
    }
}

impl GameNotifier for MockNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.write().push(notice);
    }
}
