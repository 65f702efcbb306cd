pub mod number;

pub use number::{FromNumber, Number, NumberKind};
