pub mod editor;
pub mod history;
pub mod ids;
pub mod numbering;
pub mod print;
pub mod state;
pub mod totals;
