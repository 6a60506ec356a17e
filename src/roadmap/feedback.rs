use crate::error::RoadmapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    /// Rejected edits warn; anything else that failed is an error.
    pub fn for_error(err: &RoadmapError) -> Self {
        if err.is_rejection() {
            NoticeLevel::Warning
        } else {
            NoticeLevel::Error
        }
    }
}

/// The surrounding application chrome: notifications and confirmations.
pub trait Feedback {
    fn notify(&mut self, level: NoticeLevel, message: String);

    /// Ask a yes/no question; `true` means go ahead.
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

/// Records notices and answers confirmations with a fixed reply.
#[derive(Debug, Clone, Default)]
pub struct RecordingFeedback {
    pub notices: Vec<(NoticeLevel, String)>,
    pub confirmations: Vec<String>,
    pub answer: bool,
}

impl RecordingFeedback {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    pub fn last(&self) -> Option<&(NoticeLevel, String)> {
        self.notices.last()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices.iter().filter(|(l, _)| *l == level).count()
    }
}

impl Feedback for RecordingFeedback {
    fn notify(&mut self, level: NoticeLevel, message: String) {
        self.notices.push((level, message));
    }

    fn confirm(&mut self, title: &str, _message: &str) -> bool {
        self.confirmations.push(title.to_string());
        self.answer
    }
}
