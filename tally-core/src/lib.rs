pub mod normalize;
pub mod standings;
pub mod board;
pub mod access;
pub mod events;

// Re-export main components
pub use normalize::*;
pub use standings::*;
pub use board::*;
pub use access::*;
pub use events::*;
