//! UseCase layer: one struct per protocol operation of the presence
//! coordinator. Explicit room join/leave requests carry no presence side
//! effects and go straight from the UI layer to the room router.

mod connect_session;
mod disconnect_session;

pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
