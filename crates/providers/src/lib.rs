pub mod classifier;
pub mod gemini;
pub mod invoker;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use classifier::{strip_code_fences, MessageClassifier};
pub use gemini::GeminiProvider;
pub use invoker::TurnInvoker;
pub use traits::{Completion, CompletionProvider, CompletionRequest};
