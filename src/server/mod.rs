pub mod app_state;
pub mod guards;
pub mod session;
pub mod session_manager;
pub mod snapshot;
pub mod supervisor;

pub use app_state::AppState;
pub use session::Session;
pub use session_manager::SessionRegistry;
pub use snapshot::{SessionSnapshot, write_snapshot};
pub use supervisor::TaskSupervisor;
