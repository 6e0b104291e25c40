//! Built-in tools that come with the engine.

mod batch;
mod calculator;
mod multi_weather;
mod summary;
mod text;
pub mod weather;

pub use batch::BatchCalculatorTool;
pub use calculator::{ArithmeticOp, CalculatorTool, Operation};
pub use multi_weather::MultiWeatherTool;
pub use summary::DataSummaryTool;
pub use text::{TextOp, TextProcessorTool};
pub use weather::{WeatherReport, WeatherTool};
