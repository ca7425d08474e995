pub mod alert;
pub mod snapshot;

pub use alert::{ChangeAlert, Direction};
pub use snapshot::{MonitoredAssetSet, PriceSnapshot};
