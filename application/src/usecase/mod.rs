mod transcribe;

pub use transcribe::{TranscribeUseCase, TranscribeUseCaseImpl};
