//! Shelf Core - Entity Types
//!
//! Data structures shared by the store client and the view controller.
//! Nothing in this crate performs I/O.

pub mod category;
pub mod clock;
pub mod error;
pub mod identity;
pub mod note;
pub mod queue;

pub use category::{
    Category, CategoryCatalog, CategorySource, CategoryStyle, CountPolicy, DEFAULT_BORDER_COLOR,
    DEFAULT_COLOR, DEFAULT_TEXT_COLOR, PLACEHOLDER_NAME,
};
pub use clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use error::{StoreError, StoreOp, StoreResult};
pub use identity::{date_stamp, new_document_id, NoteId, Timestamp};
pub use note::{Note, NoteDraft, NotePatch, CREATED_AT_FIELD, UPDATED_AT_FIELD};
pub use queue::{QueueItem, QueueStatus, ReadingQueue};
