pub mod company_handlers;
pub mod job_handlers;
pub mod profile_handlers;
pub mod scan_handlers;
pub mod system_handlers;

pub use company_handlers::*;
pub use job_handlers::*;
pub use profile_handlers::*;
pub use scan_handlers::*;
pub use system_handlers::*;
