use color_eyre::eyre::Result;

use crate::config::{config_path, UserConfig};

pub fn run(config: &UserConfig, path: bool, reset: bool) -> Result<()> {
    let config_file = config_path();

    if path {
        println!("{}", config_file.display());
        return Ok(());
    }

    if reset {
        UserConfig::default().save()?;
        println!("Config reset to defaults at: {}", config_file.display());
        return Ok(());
    }

    println!("Config file: {}", config_file.display());
    println!("Tag image:   {}", config.effective_tag_path().display());
    println!();
    println!("{}", toml::to_string_pretty(config)?);

    Ok(())
}
