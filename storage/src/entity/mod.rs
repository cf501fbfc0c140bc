//! `SeaORM` entities for the market-data schema

pub mod candles;
pub mod exchange_symbols;
pub mod exchanges;
pub mod market_types;
pub mod symbols;
