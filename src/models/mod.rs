pub mod assignment;
pub mod duty;
pub mod hardware;
pub mod personnel;
pub mod report;
pub mod shift;
