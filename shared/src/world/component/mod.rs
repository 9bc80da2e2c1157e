mod replicated;

pub use replicated::Replicated;
