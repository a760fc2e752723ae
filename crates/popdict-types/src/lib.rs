pub mod entry;
pub mod example;
pub mod message;

pub use entry::{
    Definition, Definitions, EntryId, Pronunciation, Pronunciations, Region, SavedState, WordEntry,
};
pub use example::ExampleSentence;
pub use message::{Envelope, Request, STATUS_OK};
