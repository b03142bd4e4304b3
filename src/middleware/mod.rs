pub mod locale;
pub mod session;

pub use locale::locale_middleware;
pub use session::session_middleware;
