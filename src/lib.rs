pub mod browser;
pub mod error;
pub mod gherkin;
pub mod scan;

// Re-export commonly used items
pub use browser::chrome::{ChromeDriver, LaunchOptions};
pub use browser::session::{ProbeSession, SessionFactory};
pub use error::BrowserError;
pub use scan::classify::{classify_click, ClickObservation};
pub use scan::model::{
    ClickInteraction, ClickResult, HoverInteraction, InteractionMap, Link, PopupActionExpectation,
    PopupActionResult, Trigger,
};
pub use scan::scanner::Scanner;
pub use scan::ScanConfig;
