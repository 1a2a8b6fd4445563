use chrono::NaiveDate;
use clap::Subcommand;
use pillminder_core::{ScheduleDb, TrackedExpiry};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum PillAction {
    /// Track a medication's expiry date
    Add {
        /// Display name
        name: String,
        /// Expiry date (YYYY-MM-DD)
        #[arg(long)]
        expires: NaiveDate,
    },
    /// List tracked medications
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stop tracking a medication by id
    Remove { id: String },
}

pub fn run(action: PillAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = ScheduleDb::open()?;
    match action {
        PillAction::Add { name, expires } => {
            let pill = TrackedExpiry {
                id: Uuid::new_v4().to_string(),
                name,
                expiry_date: expires,
                enabled: true,
            };
            db.upsert_pill(&pill)?;
            println!("Tracked pill created: {}", pill.id);
        }
        PillAction::List { json } => {
            let pills = db.list_pills()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&pills)?);
            } else {
                for p in &pills {
                    println!(
                        "{}  {}  expires {}  {}",
                        p.id,
                        p.name,
                        p.expiry_date,
                        if p.enabled { "on" } else { "off" }
                    );
                }
            }
        }
        PillAction::Remove { id } => {
            if db.remove_pill(&id)? {
                println!("Removed {id}");
            } else {
                println!("No tracked pill with id {id}");
            }
        }
    }
    Ok(())
}
