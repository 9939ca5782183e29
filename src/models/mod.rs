pub mod event;
pub mod fields;
pub mod record;
pub mod task;

pub use event::{CalendarEvent, StoredEvent};
pub use fields::{ExtractedFields, Field, FieldKind, MergePolicy, UNSPECIFIED};
pub use record::CustomerRecord;
pub use task::{DailyTask, Priority};
