/// Viewer-facing state of a preview dialog. It never owns the rendered
/// document, only flags and the textual source being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewViewState {
    /// The viewer could not display the delivered artifact.
    pub load_error: bool,
    pub is_editing: bool,
    pub edited_content: Option<String>,
}

impl PreviewViewState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh handle supersedes any earlier display failure.
    pub fn reset_on_new_handle(&mut self) {
        self.load_error = false;
    }

    pub fn report_load_failure(&mut self) {
        self.load_error = true;
    }

    /// Clear the display failure without asking for a new artifact.
    pub fn retry_load(&mut self) {
        self.load_error = false;
    }

    pub fn begin_edit(&mut self, initial_content: impl Into<String>) {
        self.is_editing = true;
        self.edited_content = Some(initial_content.into());
    }

    /// Leave edit mode keeping `content`, which the caller re-renders.
    pub fn save_edit(&mut self, content: impl Into<String>) -> String {
        let content = content.into();
        self.is_editing = false;
        self.edited_content = Some(content.clone());
        content
    }

    pub fn cancel_edit(&mut self) {
        self.is_editing = false;
        self.edited_content = None;
    }
}
