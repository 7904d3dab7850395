pub mod config;
pub mod log;
pub mod logs;
pub mod report;
pub mod tag;

use std::io::Write;

use battag_ndef::ImageTag;
use color_eyre::eyre::Result;

use crate::config::UserConfig;

pub(crate) fn image_tag(config: &UserConfig) -> ImageTag {
    ImageTag::new(config.effective_tag_path(), config.tag_capacity).with_language(&config.language)
}

/// `[y/N]` prompt on stdin. Anything but `y` declines.
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}
