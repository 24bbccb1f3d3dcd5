pub mod schema;

pub use schema::{AlarmDetails, CheckDetails, CheckDoc};
