pub mod decoders;
pub mod file_walker;
pub mod request;
pub mod search;

pub use decoders::{DecodeError, Decoder, DecoderRegistry, ErrorType};
pub use file_walker::{FileFilter, FileWalker};
pub use request::{ExtensionFilter, RequestError, SearchRequest};
pub use search::{
    count_occurrences, search_directory, MatchCounter, MatchResult, ScanObserver, ScanSummary,
    SkipReason,
};
