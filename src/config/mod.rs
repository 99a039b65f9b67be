pub mod job;
pub mod merged;
pub mod settings;
pub mod stamp;
