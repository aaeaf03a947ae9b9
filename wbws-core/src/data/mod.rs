//! Bar loading, validation and synthetic generation.

pub mod ingest;
pub mod schema;
pub mod synthetic;

pub use ingest::{
    bars_to_dataframe, dataset_hash, load_bars, load_csv, load_parquet, parse_timestamp,
    read_csv_bars, write_csv, write_parquet, DataError, DateRange,
};
pub use schema::{resolve_columns, validate_bars, SchemaError, REQUIRED_COLUMNS};
pub use synthetic::{generate_bars, SyntheticConfig};
