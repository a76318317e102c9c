pub mod history;

pub use history::HistoryWindow;
