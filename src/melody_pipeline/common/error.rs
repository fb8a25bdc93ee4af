use thiserror::Error;

#[derive(Error, Debug)]
pub enum MelodyError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),
    
    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),
    
    #[error("Failed to decode image: {0}")]
    DecodeError(String),
    
    #[error("Failed to encode MIDI file: {0}")]
    EncodeError(String),
    
    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),
    
    #[error("Invalid note name: {0:?}")]
    InvalidNoteName(String),
    
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MelodyError>;
