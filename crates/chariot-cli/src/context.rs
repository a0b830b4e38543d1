use std::sync::Arc;

use anyhow::Context;
use chariot_config::ChariotConfig;
use chariot_db::service::ChariotService;

use crate::cli::GlobalFlags;
use crate::ui::ConsoleNotifier;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: ChariotService,
    pub config: ChariotConfig,
}

impl AppContext {
    pub async fn init(config: ChariotConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let service = ChariotService::from_config(&config)
            .await
            .with_context(|| {
                format!(
                    "failed to open record store at {}",
                    config.store.data_dir.display()
                )
            })?
            .with_notifier(Arc::new(ConsoleNotifier { quiet: flags.quiet }));
        Ok(Self { service, config })
    }

    /// List limit used when neither the command nor `--limit` sets one.
    #[must_use]
    pub const fn default_limit(&self) -> u32 {
        self.config.general.default_limit
    }
}
