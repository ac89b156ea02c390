//! Ready-made dialogs built on [`Overlay::wait`].

use crate::overlay::button::Button;
use crate::overlay::document::Document;
use crate::overlay::error::Result;
use crate::overlay::input::Input;
use crate::overlay::lifecycle::{Overlay, OverlayResult};

pub const OK: &str = "ok";
pub const CANCEL: &str = "cancel";
pub const YES: &str = "yes";
pub const NO: &str = "no";

/// Name of the single input shown by [`prompt`].
pub const PROMPT_INPUT: &str = "input";

/// Show an overlay with the given inputs and buttons and wait for it.
pub async fn wait(
    document: &Document,
    title: Option<&str>,
    message: Option<&str>,
    inputs: Vec<Input>,
    buttons: Vec<Button>,
) -> Result<OverlayResult> {
    let overlay = Overlay::new(
        document,
        title.unwrap_or_default(),
        message.unwrap_or_default(),
        inputs,
        buttons,
    )
    .await?;
    overlay.wait().await
}

/// Show a message with a single button and wait until it is dismissed.
pub async fn alert(
    document: &Document,
    title: Option<&str>,
    message: Option<&str>,
    ok_label: &str,
) -> Result<()> {
    wait(document, title, message, Vec::new(), vec![Button::new(ok_label, OK)]).await?;
    Ok(())
}

/// Ask a yes/no question. Returns whether the "yes" button was pressed.
pub async fn confirm(
    document: &Document,
    title: Option<&str>,
    message: Option<&str>,
    no_label: &str,
    yes_label: &str,
) -> Result<bool> {
    let result = wait(
        document,
        title,
        message,
        Vec::new(),
        vec![Button::new(no_label, NO), Button::new(yes_label, YES)],
    )
    .await?;
    Ok(result.button == YES)
}

/// Ask for one line of text.
///
/// Returns `None` when any button other than "ok" was pressed. The cancel
/// button is only shown when `cancel_label` is given.
pub async fn prompt(
    document: &Document,
    title: Option<&str>,
    message: Option<&str>,
    placeholder: Option<&str>,
    value: Option<&str>,
    cancel_label: Option<&str>,
    ok_label: &str,
) -> Result<Option<String>> {
    let mut input = Input::new(PROMPT_INPUT).auto_focus();
    if let Some(placeholder) = placeholder {
        input = input.with_placeholder(placeholder);
    }
    if let Some(value) = value {
        input = input.with_value(value);
    }

    let mut buttons = Vec::with_capacity(2);
    if let Some(cancel_label) = cancel_label {
        buttons.push(Button::new(cancel_label, CANCEL));
    }
    buttons.push(Button::new(ok_label, OK));

    let result = wait(document, title, message, vec![input], buttons).await?;
    if result.button != OK {
        return Ok(None);
    }
    Ok(Some(result.input(PROMPT_INPUT).to_string()))
}

/// Show a bare loading spinner. The caller removes it when done.
pub fn loading(document: &Document) -> Overlay {
    let overlay = Overlay::create(document, "", "", Vec::new());
    overlay.set_transparent(true);
    overlay.show_loading(true, true);
    overlay.show();
    overlay
}
