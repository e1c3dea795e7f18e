pub mod aggregator;
pub mod api;
pub mod coerce;
pub mod impact;
pub mod locator;
pub mod ready;
pub mod render;
pub mod widgets;
