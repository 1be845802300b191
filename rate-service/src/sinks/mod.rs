pub mod reading_collector;

pub use reading_collector::ReadingCollector;
