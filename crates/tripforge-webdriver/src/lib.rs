pub mod page;

pub use page::WebDriverPage;
