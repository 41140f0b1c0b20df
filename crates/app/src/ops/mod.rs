pub mod available;
pub mod version;

pub use available::Available;
pub use version::Version;
