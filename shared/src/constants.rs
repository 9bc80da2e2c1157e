use std::time::Duration;

/// How many distinct field ids one change record can hold before tracking
/// degrades to a whole-entity update.
pub const CHANGE_RECORD_CAPACITY: usize = 19;

/// Total change records shared by every entity in one world.
pub const CHANGE_POOL_CAPACITY: usize = 100;

/// Default number of entity slots in a world.
pub const DEFAULT_SLOT_CAPACITY: usize = 2048;

/// Default cooldown before a freed slot becomes eligible for reuse.
pub const DEFAULT_REUSE_DELAY: Duration = Duration::from_secs(1);
