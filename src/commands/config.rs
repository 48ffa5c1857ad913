//! Config Command
//!
//! Shows and updates the persisted configuration file.

use crate::cli::{ConfigArgs, ConfigCommand};
use crate::models::settings::SettingsUpdate;
use crate::output;
use crate::storage::config::ConfigService;
use crate::utils::error::AppResult;

pub fn run(args: &ConfigArgs) -> AppResult<()> {
    let mut service = ConfigService::new()?;
    match &args.command {
        ConfigCommand::Show => {
            print!("{}", output::render_config(service.get_config()));
        }
        ConfigCommand::SetEndpoint(set) => {
            service.update_config(SettingsUpdate {
                endpoint: Some(set.endpoint.clone()),
                ..Default::default()
            })?;
            println!("Endpoint set to {}", set.endpoint);
        }
        ConfigCommand::SetMode(set) => {
            service.update_config(SettingsUpdate {
                default_mode: Some(set.mode.clone()),
                ..Default::default()
            })?;
            println!("Default mode set to {}", set.mode);
        }
    }
    Ok(())
}
