//! Report artifact writers — CSV/JSON consumers of completed runs.

pub mod account;
pub mod equity;
pub mod trades;

pub use account::write_account_details_csv;
pub use equity::write_equity_csv;
pub use trades::{write_trades_csv, write_trades_json};
