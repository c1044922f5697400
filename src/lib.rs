pub mod codec;
pub mod error;
pub mod prelude;
pub mod stone1;
pub mod walker;

pub use codec::{get_codec, Compression};
pub use error::{Error, Result};
pub use prelude::{Prelude, Version, MAGIC, PRELUDE_SIZE};
pub use stone1::{ReadOptions, Reader};

use std::io::{Read, Seek, Write};

/// Open a V1 stone archive from `src`, staging payload bodies in `sink`.
pub fn open<R, S>(src: R, sink: S) -> Result<Reader<R, S>>
where
    R: Read,
    S: Read + Write + Seek,
{
    Reader::open(src, sink, ReadOptions::default())
}

/// Like [`open`], with explicit [`ReadOptions`].
pub fn open_with_options<R, S>(src: R, sink: S, options: ReadOptions) -> Result<Reader<R, S>>
where
    R: Read,
    S: Read + Write + Seek,
{
    Reader::open(src, sink, options)
}
