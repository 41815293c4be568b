// Data acquisition: sources hand already-fetched batches to the store.

pub mod file;
pub mod simulated;
pub mod traits;

pub use file::JsonFileSource;
pub use simulated::SimulatedSource;
pub use traits::MarketSource;
