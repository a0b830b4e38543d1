use anyhow::Context;
use chariot_config::ChariotConfig;

use crate::cli::{Commands, GlobalFlags};

/// Load layered config, then apply command-line overrides and re-validate.
pub fn load_config(flags: &GlobalFlags, command: &Commands) -> anyhow::Result<ChariotConfig> {
    let mut config = ChariotConfig::load_with_dotenv().context("failed to load configuration")?;
    apply_overrides(&mut config, flags, command);
    config.validate()?;
    tracing::debug!(
        data_dir = %config.store.data_dir.display(),
        question_count = config.inspection.question_count,
        custom_catalog = config.inspection.has_custom_catalog(),
        "configuration loaded"
    );
    Ok(config)
}

fn apply_overrides(config: &mut ChariotConfig, flags: &GlobalFlags, command: &Commands) {
    if let Some(data_dir) = &flags.data_dir {
        config.store.data_dir.clone_from(data_dir);
    }
    if let Commands::Inspect(args) = command {
        if let Some(seed) = args.seed {
            config.inspection.seed = Some(seed);
        }
        if let Some(count) = args.count {
            config.inspection.question_count = count;
        }
    }
}
