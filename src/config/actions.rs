#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Quit,
    Suspend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    /// Move focus to the next input or button.
    Next,
    Previous,
    /// Press the focused button, or commit the focused input.
    Activate,
    /// Press the first button when the overlay has more than one.
    Cancel,
    /// Flip a checkbox or cycle a select.
    Toggle,
}
