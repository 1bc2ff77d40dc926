pub mod decode;
pub mod splitter;
pub mod wav;

pub use splitter::{calc_unit_duration, ByteRangeSplitter, SampleAccurateSplitter};
