//! Ingestion orchestration: the candle ingestor, the symbol reconciler and
//! series integrity checks

pub mod klines;
pub mod symbols;
pub mod validate;

pub use klines::{collect_klines, CollectReport};
pub use symbols::{reconcile, sync_symbols, SymbolDiff, SymbolSyncReport};
pub use validate::{check_series, Gap, SeriesCheck};
