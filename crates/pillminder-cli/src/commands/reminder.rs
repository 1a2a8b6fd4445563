use chrono::NaiveDate;
use clap::Subcommand;
use pillminder_core::{Reminder, ScheduleDb};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Add a time-of-day reminder
    Add {
        /// Display name, e.g. the medication
        name: String,
        /// Time of day (HH:MM, 24-hour); repeatable
        #[arg(long = "time", required = true)]
        times: Vec<String>,
        /// First active date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Last active date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,
    },
    /// List reminders
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a reminder by id
    Remove { id: String },
    /// Enable a reminder
    Enable { id: String },
    /// Disable a reminder
    Disable { id: String },
}

pub fn run(action: ReminderAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = ScheduleDb::open()?;
    match action {
        ReminderAction::Add {
            name,
            times,
            start_date,
            end_date,
        } => {
            let reminder = Reminder {
                id: Uuid::new_v4().to_string(),
                name,
                times,
                enabled: true,
                start_date,
                end_date,
            };
            reminder.validate()?;
            db.upsert_reminder(&reminder)?;
            println!("Reminder created: {}", reminder.id);
        }
        ReminderAction::List { json } => {
            let reminders = db.list_reminders()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reminders)?);
            } else {
                for r in &reminders {
                    println!(
                        "{}  {}  [{}]  {}",
                        r.id,
                        r.name,
                        r.times.join(", "),
                        if r.enabled { "on" } else { "off" }
                    );
                }
            }
        }
        ReminderAction::Remove { id } => {
            if db.remove_reminder(&id)? {
                println!("Removed {id}");
            } else {
                println!("No reminder with id {id}");
            }
        }
        ReminderAction::Enable { id } => set_enabled(&db, &id, true)?,
        ReminderAction::Disable { id } => set_enabled(&db, &id, false)?,
    }
    Ok(())
}

fn set_enabled(db: &ScheduleDb, id: &str, enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
    if db.set_reminder_enabled(id, enabled)? {
        println!("{} {id}", if enabled { "Enabled" } else { "Disabled" });
    } else {
        println!("No reminder with id {id}");
    }
    Ok(())
}
