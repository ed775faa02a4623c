//! cliclack theme following the stored color preference

use crate::preferences::Theme;
use cliclack::ThemeState;
use console::Style;

/// Prompt theme; light terminals get blue accents instead of cyan
#[derive(Debug, Clone, Copy, Default)]
pub struct LaunchpadTheme {
    preference: Theme,
}

impl LaunchpadTheme {
    pub fn new(preference: Theme) -> Self {
        Self { preference }
    }

    fn accent(&self) -> Style {
        match self.preference {
            Theme::Light => Style::new().blue(),
            Theme::Dark | Theme::System => Style::new().cyan(),
        }
    }
}

impl cliclack::Theme for LaunchpadTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => self.accent(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => self.accent().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => self.accent(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install the theme for all prompts in this process
pub fn init_theme(preference: Theme) {
    cliclack::set_theme(LaunchpadTheme::new(preference));
}
