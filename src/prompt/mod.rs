pub mod collector;
pub mod console;
pub mod menu;

pub use collector::InputCollector;
pub use console::{Console, StdConsole};
pub use menu::MenuChooser;
