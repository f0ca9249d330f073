pub mod generate;
pub mod init;
pub mod markers;

pub use generate::{generate, GenerateArgs};
pub use init::{init, InitArgs};
pub use markers::{markers, MarkersArgs};
