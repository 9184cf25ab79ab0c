pub mod tab_driver;

pub use tab_driver::{BrowserTabs, Tab, TabDriver, TabOpener};
