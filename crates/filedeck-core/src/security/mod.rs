//! Path confinement and permission checks.

pub mod access;
pub mod probe;
pub mod resolver;

pub use access::is_executable;
pub use access::is_readable;
pub use access::is_writable;
pub use probe::is_recursively_deletable;
pub use resolver::PathResolver;
