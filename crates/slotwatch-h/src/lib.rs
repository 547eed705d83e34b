pub mod cdp;
pub mod session;

pub use cdp::CdpClient;
pub use session::HeadlessSession;
