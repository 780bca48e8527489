mod capture;

pub use capture::CaptureSource;
