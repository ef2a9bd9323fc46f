use anyhow::Context;
use blueprint_core::{
    command::Command,
    config::{Config, WarnLevel},
    persist::PersistenceGateway,
    scheduler::SaveScheduler,
    store::{Applied, PlanStore},
};
use std::path::Path;

/// One CLI invocation's view of the plan: loaded on open, saved through the
/// debounced scheduler, and flushed on close.
pub struct Session {
    pub store: PlanStore,
    pub config: Config,
    scheduler: SaveScheduler,
    runtime: tokio::runtime::Runtime,
}

impl Session {
    pub fn open(home: &Path) -> anyhow::Result<Self> {
        let config = Config::load(home).context("failed to read config.yaml")?;
        for warning in config.validate() {
            match warning.level {
                WarnLevel::Warning => tracing::warn!("config: {}", warning.message),
                WarnLevel::Error => anyhow::bail!("config: {}", warning.message),
            }
        }

        let gateway = PersistenceGateway::file(config.plan_path(home));
        let store = PlanStore::new(gateway.load());

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("failed to start runtime")?;
        let scheduler = {
            let _guard = runtime.enter();
            SaveScheduler::spawn(gateway, config.debounce())
        };

        Ok(Self {
            store,
            config,
            scheduler,
            runtime,
        })
    }

    /// Dispatch `command` and queue a save when it changed anything.
    pub fn apply(&mut self, command: Command) -> Applied {
        let applied = self.store.dispatch(command);
        if applied.changed {
            self.scheduler.schedule(applied.plan.clone());
        }
        applied
    }

    /// Write any pending change and stop the background writer.
    pub fn close(self) {
        let Session {
            scheduler, runtime, ..
        } = self;
        runtime.block_on(scheduler.shutdown());
    }
}
