mod handle_stream;
mod serve_session;

pub use handle_stream::HandleDoqStreamUseCase;
pub use serve_session::ServeDoqSessionUseCase;
