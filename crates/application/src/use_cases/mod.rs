pub mod doq;

pub use doq::{HandleDoqStreamUseCase, ServeDoqSessionUseCase};
