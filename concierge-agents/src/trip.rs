use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use concierge_core::{AgentError, AgentGraph, RunContext};

use crate::flight::FlightBooking;
use crate::hotel::HotelBooking;

const STREAM_PACING: Duration = Duration::from_millis(15);

/// The trip supervisor: plans the flight and the hotel legs in sequence
/// and publishes the merged itinerary.
#[derive(Debug, Default)]
pub struct TripSupervisor;

impl TripSupervisor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentGraph for TripSupervisor {
    fn name(&self) -> &str {
        "supervisor"
    }

    fn description(&self) -> &str {
        "Book a trip"
    }

    async fn run(&self, ctx: &RunContext) -> Result<String, AgentError> {
        let request = ctx.latest_user_message().unwrap_or("a trip").to_string();

        ctx.text(format!("Planning your trip: \"{request}\".\n"))?;
        tokio::time::sleep(STREAM_PACING).await;

        let flight = FlightBooking::plan(&request);
        ctx.text(format!("Flight leg: {}.\n", flight.summary()))?;
        tokio::time::sleep(STREAM_PACING).await;

        let hotel = HotelBooking::plan(&request);
        ctx.text(format!("Hotel leg: {}.\n", hotel.summary()))?;
        tokio::time::sleep(STREAM_PACING).await;

        let message = format!(
            "Trip booked: {} and {}.",
            flight.summary(),
            hotel.summary()
        );
        ctx.snapshot(json!({
            "flight": flight,
            "hotel": hotel,
            "status": "booked",
        }))?;

        Ok(message)
    }
}
