//! Running a CLI subcommand as a dialog inside the [`App`].

use std::collections::HashSet;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use color_eyre::eyre::{WrapErr, bail};
use serde::Deserialize;
use tracing::{debug, info};

use crate::app::App;
use crate::cli::{Command, Text};
use crate::overlay::dialogs::{self, CANCEL, OK};
use crate::overlay::{Button, Input, Overlay, OverlayError};

const LOADING_POLL: Duration = Duration::from_millis(50);

/// What a finished subcommand reports back to the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Exit 0 when true, 1 otherwise.
    pub affirmative: bool,
    /// Printed to stdout after the terminal is restored.
    pub output: Option<String>,
}

impl Outcome {
    pub const fn cancelled() -> Self {
        Self {
            affirmative: false,
            output: None,
        }
    }

    const fn accepted(affirmative: bool) -> Self {
        Self {
            affirmative,
            output: None,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.affirmative {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        }
    }
}

/// Dialog description read by the `form` subcommand.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FormFile {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub inputs: Vec<Input>,
    /// Defaults to Cancel / OK.
    #[serde(default)]
    pub buttons: Vec<Button>,
    #[serde(default)]
    pub vertical: bool,
}

impl FormFile {
    /// Read a form from a `.json` file, or TOML for any other extension.
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read form {}", path.display()))?;
        let json = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        Self::parse(&content, json).wrap_err_with(|| format!("invalid form {}", path.display()))
    }

    pub fn parse(content: &str, json: bool) -> color_eyre::Result<Self> {
        let mut form: Self = if json {
            serde_json::from_str(content)?
        } else {
            toml::from_str(content)?
        };

        if form.buttons.is_empty() {
            form.buttons = vec![Button::new("Cancel", CANCEL), Button::new("OK", OK)];
        }
        let mut seen = HashSet::new();
        if let Some(button) = form.buttons.iter().find(|button| !seen.insert(&button.value)) {
            bail!("duplicate button value `{}`", button.value);
        }
        Ok(form)
    }
}

/// `None` when the user quit instead of answering.
fn answered<T>(outcome: Option<crate::overlay::Result<T>>) -> color_eyre::Result<Option<T>> {
    match outcome {
        None | Some(Err(OverlayError::Removed)) => Ok(None),
        Some(Err(err)) => Err(err.into()),
        Some(Ok(value)) => Ok(Some(value)),
    }
}

fn text_parts(text: &Text) -> (Option<&str>, Option<&str>) {
    (text.title.as_deref(), text.message.as_deref())
}

pub async fn run(command: Command, app: &mut App) -> color_eyre::Result<Outcome> {
    let document = app.document().clone();
    info!(?command, "Running dialog");

    let outcome = match command {
        Command::Alert { text, ok_label } => {
            let (title, message) = text_parts(&text);
            let task = dialogs::alert(&document, title, message, &ok_label);
            answered(app.run(task).await?)?.map_or_else(Outcome::cancelled, |()| Outcome::accepted(true))
        }
        Command::Confirm {
            text,
            no_label,
            yes_label,
        } => {
            let (title, message) = text_parts(&text);
            let task = dialogs::confirm(&document, title, message, &no_label, &yes_label);
            answered(app.run(task).await?)?.map_or_else(Outcome::cancelled, Outcome::accepted)
        }
        Command::Prompt {
            text,
            placeholder,
            value,
            cancel_label,
            ok_label,
        } => {
            let (title, message) = text_parts(&text);
            let task = dialogs::prompt(
                &document,
                title,
                message,
                placeholder.as_deref(),
                value.as_deref(),
                cancel_label.as_deref(),
                &ok_label,
            );
            match answered(app.run(task).await?)?.flatten() {
                Some(value) => Outcome {
                    affirmative: true,
                    output: Some(value),
                },
                None => Outcome::cancelled(),
            }
        }
        Command::Form { file } => run_form(&FormFile::load(&file)?, app).await?,
        Command::Loading { message, seconds } => {
            let overlay = dialogs::loading(&document);
            if let Some(message) = message {
                overlay.set_message(message);
            }
            let finished = app.run(spin(overlay, seconds)).await?.unwrap_or(false);
            Outcome::accepted(finished)
        }
    };

    debug!(?outcome, "Dialog finished");
    Ok(outcome)
}

async fn run_form(form: &FormFile, app: &mut App) -> color_eyre::Result<Outcome> {
    let overlay = Overlay::new(
        app.document(),
        form.title.clone(),
        form.message.clone(),
        form.inputs.clone(),
        form.buttons.clone(),
    )
    .await?;
    overlay.set_buttons_vertical(form.vertical);

    let Some(result) = answered(app.run(overlay.wait()).await?)? else {
        return Ok(Outcome::cancelled());
    };
    // A lone button is the only way out, so it always counts as yes.
    let affirmative = form.buttons.len() == 1
        || form
            .buttons
            .first()
            .is_some_and(|first| first.value != result.button);
    Ok(Outcome {
        affirmative,
        output: Some(serde_json::to_string_pretty(&result)?),
    })
}

/// Keep the spinner up for `seconds`, or until someone removes it.
///
/// Returns whether the time ran out.
async fn spin(overlay: Overlay, seconds: Option<f64>) -> bool {
    let deadline = async {
        match seconds {
            Some(seconds) => tokio::time::sleep(Duration::from_secs_f64(seconds.max(0.0))).await,
            None => std::future::pending().await,
        }
    };
    let removed = async {
        while overlay.is_attached() {
            tokio::time::sleep(LOADING_POLL).await;
        }
    };

    tokio::select! {
        () = deadline => {
            overlay.remove();
            true
        }
        () = removed => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{Document, InputKind};

    #[test]
    fn test_form_from_toml() {
        let form = FormFile::parse(
            r#"
            title = "Sign up"

            [[inputs]]
            name = "email"
            type = "email"
            required = true

            [[inputs]]
            name = "newsletter"
            type = "checkbox"
            "#,
            false,
        )
        .unwrap();
        assert_eq!(form.title, "Sign up");
        assert_eq!(form.inputs[0].kind, InputKind::Email);
        assert_eq!(form.inputs[1].kind, InputKind::Checkbox);
        let values: Vec<_> = form.buttons.iter().map(|button| button.value.as_str()).collect();
        assert_eq!(values, vec![CANCEL, OK]);
    }

    #[test]
    fn test_form_from_json() {
        let form = FormFile::parse(
            r#"{
                "message": "Pick one",
                "vertical": true,
                "buttons": [
                    {"label": "Red", "value": "red"},
                    {"label": "Blue", "value": "blue", "title": "The calm one"}
                ]
            }"#,
            true,
        )
        .unwrap();
        assert!(form.vertical);
        assert!(form.inputs.is_empty());
        assert_eq!(form.buttons[1].title.as_deref(), Some("The calm one"));
    }

    #[test]
    fn test_form_rejects_duplicate_buttons() {
        let error = FormFile::parse(
            r#"
            [[buttons]]
            label = "A"
            value = "same"

            [[buttons]]
            label = "B"
            value = "same"
            "#,
            false,
        )
        .unwrap_err();
        assert!(error.to_string().contains("duplicate button value"));
    }

    #[test]
    fn test_answered_maps_removal_to_none() {
        assert_eq!(answered::<u8>(None).unwrap(), None);
        assert_eq!(answered::<u8>(Some(Err(OverlayError::Removed))).unwrap(), None);
        assert_eq!(answered(Some(Ok(3))).unwrap(), Some(3));
        assert!(answered::<u8>(Some(Err(OverlayError::Abandoned))).is_err());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::accepted(true).exit_code(), ExitCode::SUCCESS);
        assert_eq!(Outcome::cancelled().exit_code(), ExitCode::from(1));
    }

    #[tokio::test]
    async fn test_spin_reports_removal() {
        let document = Document::new();
        let overlay = dialogs::loading(&document);
        let task = tokio::spawn(spin(overlay.clone(), None));
        overlay.remove();
        assert!(!task.await.unwrap());

        let overlay = dialogs::loading(&document);
        assert!(spin(overlay.clone(), Some(0.0)).await);
        assert!(!overlay.is_attached());
    }
}
