//! Notices go to the log and are kept for the map document.

use overlay_pipeline::{Notice, NoticeLevel, Notifier};
use tracing::{error, info, warn};

#[derive(Debug, Default)]
pub struct LogNotifier {
    notices: Vec<Notice>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn into_notices(self) -> Vec<Notice> {
        self.notices
    }
}

impl Notifier for LogNotifier {
    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!(message = %notice.message, "Notice"),
            NoticeLevel::Warning => warn!(message = %notice.message, "Notice"),
            NoticeLevel::Error => error!(message = %notice.message, "Notice"),
        }
        self.notices.push(notice);
    }
}
