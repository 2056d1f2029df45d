pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod query;
pub mod record;
pub mod store;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::TrackerConfig;
pub use error::{ErrorKind, PharmaTrackError, Result};
pub use query::{Query, SearchColumn};
pub use record::{InventoryRecord, RawFields, RecordFields, RecordId};
pub use store::Store;
pub use validation::{Field, ValidationError, ValidationErrorKind};
