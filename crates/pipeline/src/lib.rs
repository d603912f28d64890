pub mod builder;
pub mod config;
pub mod driver;
pub mod report;
pub mod retry;

pub use builder::FragmentBuilder;
pub use config::{PipelineConfig, RetryConfig};
pub use driver::Pipeline;
pub use report::RunReport;
pub use retry::RetryPolicy;
