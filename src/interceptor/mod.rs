pub mod method;
pub mod pattern;
pub mod registry;

pub use method::MethodInterceptor;
pub use pattern::BackupPattern;
pub use registry::InterceptorRegistry;
