//! Terminal output for the CLI
//!
//! Decorated output goes through `cliclack`; in CI, pipes, or when a command
//! prints JSON, the same calls fall back to plain lines.

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, outro_success, outro_warn, remark, status_style, step_error_detail,
    step_info, step_ok, step_ok_detail, step_warn_hint, Table,
};
pub use progress::{format_size, TaskSpinner, UploadProgress};
pub use prompts::{confirm, input, password};
pub use theme::{init_theme, LaunchpadTheme};
