mod trailed_bit_set;
mod trailed_integer;
mod trailed_values;

pub use trailed_bit_set::TrailedBitSet;
pub use trailed_integer::TrailedInteger;
pub use trailed_values::TrailedValues;
