use thiserror::Error;

/// Everything that can go wrong while fingerprinting or aligning.
#[derive(Error, Debug)]
pub enum Error {
    #[error("audio too short to fingerprint: {samples} samples at {sample_rate} Hz")]
    AudioTooShort { samples: usize, sample_rate: u32 },
    #[error("STFT segment must be longer than 16 samples, got {0}")]
    StftSegmentTooShort(usize),
    #[error("STFT segment must be a power of two, got {0}")]
    InvalidStftSegment(usize),
    #[error("cannot set up an FFT of length {0}")]
    CannotSetupFft(usize),
    #[error("no patterns could be generated from the audio")]
    NoPatternsFound,
    #[error("fingerprints were built with different configurations")]
    ConfigurationMismatch,
    #[error("fingerprints share no patterns")]
    NoMatchesFound,
    #[error("cannot create PCM buffer: {0}")]
    CannotCreatePcmBuffer(String),
    #[error("cannot create audio converter: {0}")]
    CannotCreateAudioConverter(String),
}
