pub mod history;
pub mod receipts;
pub mod session;
pub mod settings;
