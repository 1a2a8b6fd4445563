use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Subcommand, ValueEnum};
use pillminder_core::{
    AlarmCategory, AlarmEngine, Config, JsonStateStore, Poller, ScheduleDb, SystemClock,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    /// Time-of-day medication alarms
    Medication,
    /// Medication expiry alarms
    Expiry,
}

impl From<CategoryArg> for AlarmCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Medication => AlarmCategory::Medication,
            CategoryArg::Expiry => AlarmCategory::Expiry,
        }
    }
}

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Print the pending sets as JSON
    Status,
    /// Confirm pending alarms by id
    Confirm {
        category: CategoryArg,
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Dismiss the category's pending alarms (re-alarms after cooldown)
    Dismiss { category: CategoryArg },
    /// Run the poller, printing events as JSON lines until Ctrl-C
    Watch {
        /// Seconds between checks (default from config)
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

fn build_engine(
    config: &Config,
) -> Result<AlarmEngine<SystemClock, JsonStateStore>, Box<dyn std::error::Error>> {
    let store = JsonStateStore::open()?;
    Ok(AlarmEngine::new(SystemClock, store, config.cooldowns))
}

pub fn run(action: AlarmAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    match action {
        AlarmAction::Status => {
            let engine = build_engine(&config)?;
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
        }
        AlarmAction::Confirm { category, ids } => {
            let mut engine = build_engine(&config)?;
            match engine.confirm(category.into(), &ids) {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("Nothing to confirm"),
            }
        }
        AlarmAction::Dismiss { category } => {
            let mut engine = build_engine(&config)?;
            match engine.dismiss(category.into()) {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!("Nothing to dismiss"),
            }
        }
        AlarmAction::Watch { interval_secs } => watch(&config, interval_secs)?,
    }
    Ok(())
}

fn watch(config: &Config, interval_secs: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let interval = Duration::from_secs(interval_secs.unwrap_or(config.poller.interval_secs));
    let engine = Arc::new(Mutex::new(build_engine(config)?));
    let repository = Arc::new(Mutex::new(ScheduleDb::open()?));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let (mut poller, mut events) = Poller::new(engine, repository, interval);
        poller.start();
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                event = events.recv() => match event {
                    Some(event) => match serde_json::to_string(&event) {
                        Ok(line) => println!("{line}"),
                        Err(e) => log::warn!("failed to encode event: {e}"),
                    },
                    None => break,
                },
            }
        }
        poller.stop();
    });
    Ok(())
}
