pub mod recommendation;
pub mod servers;
pub mod session;
pub mod telemetry;

pub use recommendation::{GeminiRecommender, Recommender};
pub use servers::ServerCatalog;
pub use session::{Handshake, Session, SessionController, SessionEvent, SimulatedHandshake};
pub use telemetry::{RollingWindow, TelemetryFeed, TelemetryHandle};
