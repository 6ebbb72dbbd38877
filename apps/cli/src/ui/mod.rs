pub mod prompt;
pub mod theme;

pub use theme::Theme;
