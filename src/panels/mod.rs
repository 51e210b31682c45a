mod capture_panel;
mod editor_panel;
mod picker_panel;

pub use capture_panel::capture_panel;
pub use editor_panel::editor_panel;
pub use picker_panel::picker_panel;
