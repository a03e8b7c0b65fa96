pub mod chrome;
pub mod session;

pub use chrome::{ChromeDriver, LaunchOptions};
pub use session::{ProbeSession, SessionFactory};
