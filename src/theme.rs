use std::collections::BTreeMap;

use catppuccin::PALETTE;
use ratatui::style::Color;
use ratatui::widgets::BorderType;
use thiserror::Error;
use tracing::warn;

/// Convert a catppuccin color to a ratatui color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("unknown overlay palette variable `{0}`")]
    UnknownVariable(String),
    #[error("`{0}` is neither a palette token, a theme colour nor #rrggbb")]
    UnknownColor(String),
}

/// The four palette tokens overlay variables default to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteToken {
    Foreground,
    Background,
    Accent,
    AccentForeground,
}

impl PaletteToken {
    pub const ALL: [Self; 4] = [
        Self::Foreground,
        Self::Background,
        Self::Accent,
        Self::AccentForeground,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Foreground => "foreground-color",
            Self::Background => "background-color",
            Self::Accent => "accent-color",
            Self::AccentForeground => "accent-foreground-color",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|token| token.name() == name)
    }
}

/// Colours of the overlay container, its buttons and the loading spinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayPalette {
    pub container_background: Color,
    pub container_border: Color,
    pub container_foreground: Color,
    pub container_focus: Color,
    pub button_background: Color,
    pub button_foreground: Color,
    pub button_focus: Color,
    pub active_button_background: Color,
    pub active_button_foreground: Color,
    pub loading: Color,
}

/// Variable names and the token each defaults to.
const VARIABLES: [(&str, PaletteToken); 10] = [
    ("container-background", PaletteToken::Background),
    ("container-border", PaletteToken::Accent),
    ("container-foreground", PaletteToken::Foreground),
    ("container-focus-outline", PaletteToken::Accent),
    ("button-background", PaletteToken::Background),
    ("button-foreground", PaletteToken::Foreground),
    ("button-focus-outline", PaletteToken::Accent),
    ("active-button-background", PaletteToken::Accent),
    ("active-button-foreground", PaletteToken::AccentForeground),
    ("loading-color", PaletteToken::Accent),
];

impl OverlayPalette {
    const fn from_tokens(foreground: Color, background: Color, accent: Color, accent_foreground: Color) -> Self {
        Self {
            container_background: background,
            container_border: accent,
            container_foreground: foreground,
            container_focus: accent,
            button_background: background,
            button_foreground: foreground,
            button_focus: accent,
            active_button_background: accent,
            active_button_foreground: accent_foreground,
            loading: accent,
        }
    }

    fn slot_mut(&mut self, variable: &str) -> Option<&mut Color> {
        let slot = match variable {
            "container-background" => &mut self.container_background,
            "container-border" => &mut self.container_border,
            "container-foreground" => &mut self.container_foreground,
            "container-focus-outline" => &mut self.container_focus,
            "button-background" => &mut self.button_background,
            "button-foreground" => &mut self.button_foreground,
            "button-focus-outline" => &mut self.button_focus,
            "active-button-background" => &mut self.active_button_background,
            "active-button-foreground" => &mut self.active_button_foreground,
            "loading-color" => &mut self.loading,
            _ => return None,
        };
        Some(slot)
    }

    /// Names accepted as override keys: the tokens, then every variable.
    pub fn variable_names() -> impl Iterator<Item = &'static str> {
        PaletteToken::ALL
            .into_iter()
            .map(PaletteToken::name)
            .chain(VARIABLES.iter().map(|(name, _)| *name))
    }
}

/// Application theme with customizable colors.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: Color,
    pub mantle: Color,
    pub crust: Color,

    pub surface0: Color,
    pub surface1: Color,
    pub surface2: Color,

    pub overlay0: Color,
    pub overlay1: Color,
    pub overlay2: Color,

    pub text: Color,
    pub subtext0: Color,
    pub subtext1: Color,

    pub rosewater: Color,
    pub flamingo: Color,
    pub pink: Color,
    pub mauve: Color,
    pub red: Color,
    pub maroon: Color,
    pub peach: Color,
    pub yellow: Color,
    pub green: Color,
    pub teal: Color,
    pub sky: Color,
    pub sapphire: Color,
    pub blue: Color,
    pub lavender: Color,

    pub border_type: BorderType,
    pub overlay: OverlayPalette,
}

impl Theme {
    /// Create a theme from a Catppuccin flavor.
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        let text = catppuccin_to_color(&c.text);
        let base = catppuccin_to_color(&c.base);
        let mauve = catppuccin_to_color(&c.mauve);
        let crust = catppuccin_to_color(&c.crust);
        Self {
            base,
            mantle: catppuccin_to_color(&c.mantle),
            crust,
            surface0: catppuccin_to_color(&c.surface0),
            surface1: catppuccin_to_color(&c.surface1),
            surface2: catppuccin_to_color(&c.surface2),
            overlay0: catppuccin_to_color(&c.overlay0),
            overlay1: catppuccin_to_color(&c.overlay1),
            overlay2: catppuccin_to_color(&c.overlay2),
            text,
            subtext0: catppuccin_to_color(&c.subtext0),
            subtext1: catppuccin_to_color(&c.subtext1),
            rosewater: catppuccin_to_color(&c.rosewater),
            flamingo: catppuccin_to_color(&c.flamingo),
            pink: catppuccin_to_color(&c.pink),
            mauve,
            red: catppuccin_to_color(&c.red),
            maroon: catppuccin_to_color(&c.maroon),
            peach: catppuccin_to_color(&c.peach),
            yellow: catppuccin_to_color(&c.yellow),
            green: catppuccin_to_color(&c.green),
            teal: catppuccin_to_color(&c.teal),
            sky: catppuccin_to_color(&c.sky),
            sapphire: catppuccin_to_color(&c.sapphire),
            blue: catppuccin_to_color(&c.blue),
            lavender: catppuccin_to_color(&c.lavender),
            border_type: BorderType::Rounded,
            overlay: OverlayPalette::from_tokens(text, base, mauve, crust),
        }
    }

    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    #[must_use]
    pub const fn text(&self) -> Color {
        self.text
    }

    #[must_use]
    pub const fn error(&self) -> Color {
        self.red
    }

    /// Foreground for anything that is on screen but not interactive.
    #[must_use]
    pub const fn dimmed(&self) -> Color {
        self.overlay0
    }

    #[must_use]
    pub const fn muted(&self) -> Color {
        self.subtext0
    }

    #[must_use]
    pub const fn field_background(&self) -> Color {
        self.surface0
    }

    /// Look up a catppuccin colour by its lowercase name.
    pub fn color_by_name(&self, name: &str) -> Option<Color> {
        let color = match name {
            "base" => self.base,
            "mantle" => self.mantle,
            "crust" => self.crust,
            "surface0" => self.surface0,
            "surface1" => self.surface1,
            "surface2" => self.surface2,
            "overlay0" => self.overlay0,
            "overlay1" => self.overlay1,
            "overlay2" => self.overlay2,
            "text" => self.text,
            "subtext0" => self.subtext0,
            "subtext1" => self.subtext1,
            "rosewater" => self.rosewater,
            "flamingo" => self.flamingo,
            "pink" => self.pink,
            "mauve" => self.mauve,
            "red" => self.red,
            "maroon" => self.maroon,
            "peach" => self.peach,
            "yellow" => self.yellow,
            "green" => self.green,
            "teal" => self.teal,
            "sky" => self.sky,
            "sapphire" => self.sapphire,
            "blue" => self.blue,
            "lavender" => self.lavender,
            _ => return None,
        };
        Some(color)
    }

    /// Apply overlay palette overrides.
    ///
    /// Token overrides (`accent-color`, ...) are applied first and feed every
    /// variable that defaults to that token. Variable overrides then win over
    /// their token. Values may name a token, a theme colour or `#rrggbb`.
    pub fn with_palette(mut self, overrides: &BTreeMap<String, String>) -> Result<Self, PaletteError> {
        let mut tokens = [self.text, self.base, self.mauve, self.crust];
        for token in PaletteToken::ALL {
            if let Some(value) = overrides.get(token.name()) {
                tokens[token.index()] = self.resolve_color(value, None)?;
            }
        }

        let mut palette = self.overlay;
        for (name, token) in VARIABLES {
            let color = match overrides.get(name) {
                Some(value) => self.resolve_color(value, Some(&tokens))?,
                None => tokens[token.index()],
            };
            if let Some(slot) = palette.slot_mut(name) {
                *slot = color;
            }
        }

        if let Some(unknown) = overrides
            .keys()
            .find(|key| !OverlayPalette::variable_names().any(|name| name == key.as_str()))
        {
            return Err(PaletteError::UnknownVariable(unknown.clone()));
        }

        self.overlay = palette;
        Ok(self)
    }

    fn resolve_color(&self, value: &str, tokens: Option<&[Color; 4]>) -> Result<Color, PaletteError> {
        let value = value.trim();
        if let Some(token) = PaletteToken::from_name(value) {
            let defaults = [self.text, self.base, self.mauve, self.crust];
            return Ok(tokens.unwrap_or(&defaults)[token.index()]);
        }
        if let Some(color) = self.color_by_name(&value.to_lowercase()) {
            return Ok(color);
        }
        parse_hex(value).ok_or_else(|| PaletteError::UnknownColor(value.to_string()))
    }
}

fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

/// Information about a built-in theme.
#[derive(Debug, Clone)]
pub struct ThemeInfo {
    pub name: &'static str,
    pub theme: Theme,
}

impl ThemeInfo {
    const fn new(name: &'static str, theme: Theme) -> Self {
        Self { name, theme }
    }
}

impl std::fmt::Display for ThemeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Returns a list of all available built-in themes.
pub fn available_themes() -> Vec<ThemeInfo> {
    vec![
        ThemeInfo::new("Catppuccin Mocha", Theme::catppuccin_mocha()),
        ThemeInfo::new("Catppuccin Macchiato", Theme::catppuccin_macchiato()),
        ThemeInfo::new("Catppuccin Frappé", Theme::catppuccin_frappe()),
        ThemeInfo::new("Catppuccin Latte", Theme::catppuccin_latte()),
    ]
}

/// Look up a theme by name. Returns the default theme if not found.
pub fn theme_from_name(name: &str) -> Theme {
    available_themes()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .map_or_else(
            || {
                warn!(name, "Unknown theme, falling back to the default");
                Theme::default()
            },
            |t| t.theme,
        )
}
