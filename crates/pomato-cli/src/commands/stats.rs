use clap::Subcommand;
use pomato_core::storage::Database;
use pomato_core::StatsLedger;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's cumulative counters
    Show,
    /// Zero the counters and persist them
    Reset,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Show => {
            let ledger = StatsLedger::load(&db);
            println!("{}", serde_json::to_string_pretty(&ledger.snapshot())?);
        }
        StatsAction::Reset => {
            StatsLedger::new().save(&db)?;
            println!("stats reset");
        }
    }
    Ok(())
}
