pub mod wav;

pub use wav::AudioInput;
