pub mod depths;
pub mod references;

pub use depths::{format_user_depths, get_depths, parse_user_depths, pass_depths, step_depths};
pub use references::set_depths_from_references;
