//! Version 1 of the stone format.
//!
//! After the 32-byte prelude, a V1 archive is a sequence of payloads, each a
//! 32-byte [`PayloadHeader`] followed by `stored_size` body bytes.  A body
//! holds `num_records` records of a single [`RecordKind`].

pub mod header;
pub mod payload;
pub mod prelude;
pub mod reader;
pub mod record;

pub use header::{PayloadHeader, RecordKind, PAYLOAD_HEADER_SIZE};
pub use payload::ChecksumScope;
pub use prelude::{StoneType, V1Prelude, FORMAT_MARKER};
pub use reader::{ReadOptions, Reader, ReaderStats, State};
pub use record::{
    AttributeRecord, ContentReader, ContentRecord, Dependency, DependencyKind, FileType,
    IndexRecord, LayoutEntry, LayoutRecord, MetaField, MetaRecord, MetaTag, Record,
};
