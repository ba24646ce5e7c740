mod identifier;
mod range;

pub use identifier::Identifier;
pub use range::{ByteRange, MultiDimensionalNumericData, NumericRange, ScanBounds, next_prefix};
