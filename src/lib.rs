use directories::ProjectDirs;

pub mod args;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod ticker;
pub mod time;
pub mod timers;

pub fn dirs() -> Result<ProjectDirs, error::CountdownError> {
    ProjectDirs::from("io", "countdowntimer", "countdown").ok_or(error::CountdownError::NoProjectDirs)
}
