pub mod fs;
pub mod markdown;
pub mod paths;
pub mod search;
pub mod syntax;
