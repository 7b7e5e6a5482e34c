pub mod fs_utils;
pub mod time_utils;
