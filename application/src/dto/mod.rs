mod transcribe;

pub use transcribe::{TranscribeRequest, TranscribeResponse};
