//! Theme command - show or store the color theme

use crate::cli::args::{ThemeAction, ThemeArgs};
use crate::error::LaunchpadResult;
use crate::preferences::{load_theme, save_theme};
use crate::storage::FileStorage;
use crate::ui::{self, UiContext};

pub async fn execute(args: ThemeArgs) -> LaunchpadResult<()> {
    let storage = FileStorage::open_default().await?;

    match args.action {
        None | Some(ThemeAction::Show) => println!("{}", load_theme(&storage).await?),
        Some(ThemeAction::Set { theme }) => {
            save_theme(&storage, theme).await?;
            ui::step_ok(&UiContext::detect(), &format!("Theme set to {}", theme));
        }
    }
    Ok(())
}
