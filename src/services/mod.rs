pub mod decode;
pub mod store;
pub mod sync;
pub mod transform;
pub mod tushare;

pub use decode::{Payload, RawRow};
pub use store::{BatchWriter, ClickHouseStore, Column, ColumnBatch, ColumnStore};
pub use sync::{StaticUniverse, SyncRunner, UniverseProvider};
pub use tushare::TushareClient;
