//! Sortable unique identifiers
//!
//! Ids are ULIDs from a monotonic generator: within the same millisecond the
//! random component is incremented instead of redrawn, so ids compare in
//! generation order both numerically and as strings.

use crate::error::{DataError, DataResult};
use parking_lot::Mutex;

/// Process-wide monotonic ULID source
pub struct IdGenerator {
    generator: Mutex<ulid::Generator>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            generator: Mutex::new(ulid::Generator::new()),
        }
    }

    /// Next id as its 26-character Crockford base32 text
    pub fn next_id(&self) -> DataResult<String> {
        let mut generator = self.generator.lock();
        generator
            .generate()
            .map(|ulid| ulid.to_string())
            .map_err(|e| DataError::IdGeneration(e.to_string()))
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
