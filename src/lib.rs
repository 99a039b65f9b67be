pub mod config;
pub mod error;
pub mod layout;
pub mod logo;
pub mod pdf;
pub mod pipeline;
pub mod protection;
pub mod style;

pub use config::stamp::StampConfiguration;
pub use error::{Result, StampError};
pub use pipeline::stamper::{StampReport, StampWarning, Stamper, stamp_pdf};
