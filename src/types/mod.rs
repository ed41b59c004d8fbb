pub mod error;

pub use error::{AliveError, CoerceError, CoerceKind, CoerceResultExt, ErrorPolicy, Result};
