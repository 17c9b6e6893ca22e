// MegaCLI output parsing
//
// - scanner.rs: marker detection and field extraction from single lines
// - ordinal.rs: Nth-occurrence selection over repeated blocks

pub mod ordinal;
pub mod scanner;

pub use ordinal::OrdinalSelector;
pub use scanner::{bounded, leading_int, segment, token, FieldExtractor};
