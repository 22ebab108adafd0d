//! Settings command handlers.

use clap::Subcommand;
use vagent_core::Settings;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name
        key: String,
    },
    /// Change one setting and save it
    Set {
        /// Setting name
        key: String,
        /// New value ("none" clears optional settings)
        value: String,
    },
    /// Print the settings file location
    Path,
}

/// Handle `vagent config`. Without a subcommand the effective settings
/// are printed as JSON.
pub async fn handle_config(command: Option<ConfigCommands>) -> anyhow::Result<()> {
    match command {
        None => {
            let settings = Settings::load().await?.with_env();
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Some(ConfigCommands::Get { key }) => {
            let settings = Settings::load().await?.with_env();
            match settings.get(&key)? {
                Some(value) => println!("{value}"),
                None => println!("(unset)"),
            }
        }
        Some(ConfigCommands::Set { key, value }) => {
            let path = Settings::default_path()?;
            // Saved settings only; environment overrides are not persisted.
            let mut settings = Settings::load_from(&path).await?;
            settings.set(&key, &value)?;
            settings.save_to(&path).await?;
            let shown = settings.get(&key)?.unwrap_or_else(|| "(unset)".to_string());
            println!("{key} = {shown}");
        }
        Some(ConfigCommands::Path) => {
            println!("{}", Settings::default_path()?.display());
        }
    }
    Ok(())
}
