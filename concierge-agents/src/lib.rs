//! The pre-built booking agents exposed by the concierge server:
//! a flight specialist, a hotel specialist, and a trip supervisor that
//! delegates to both. All three are deterministic scripted workflows.

mod flight;
mod hotel;
mod trip;

pub use flight::{FlightAgent, FlightBooking};
pub use hotel::{HotelAgent, HotelBooking};
pub use trip::TripSupervisor;
